use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

pub mod read {
    use cri_afs2::{Afs2Archive, Afs2Writer};
    use cri_hca::{CipherKind, HeaderWriter};
    use divan::Bencher;

    fn get_input(entries: u16) -> Vec<u8> {
        let mut writer = Afs2Writer::default();
        for id in 0..entries {
            let header = HeaderWriter::builder()
                .channels(2)
                .sample_rate(48000)
                .block_count(u32::from(id) * 10 + 1)
                .cipher(CipherKind::Keyed)
                .comment(format!("vo_{id:06}"))
                .build();
            let mut data = header.to_bytes();
            data.resize(data.len() + 512, 0);
            writer.push(id, data);
        }
        writer.to_bytes().unwrap()
    }

    #[divan::bench(args = [16, 256, 2048])]
    fn decode(bencher: Bencher, entries: u16) {
        bencher
            .with_inputs(|| get_input(entries))
            .bench_refs(|data| {
                divan::black_box(Afs2Archive::decode(data).unwrap());
            });
    }
}
