use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

pub mod read {
    use cri_utf::{Table, TableWriter, Value, ValueType};
    use divan::Bencher;

    fn get_input(rows: u16) -> Vec<u8> {
        let cues = (0..rows)
            .fold(
                TableWriter::new("CueName")
                    .column("CueName", ValueType::String)
                    .column("CueIndex", ValueType::U16),
                |w, i| w.row([Value::String(format!("vo_{i:06}").into()), Value::U16(i)]),
            )
            .to_bytes()
            .unwrap();

        TableWriter::new("Header")
            .constant_column("Version", Value::U32(0x01330000))
            .column("Name", ValueType::String)
            .column("CueNameTable", ValueType::Data)
            .row([Value::String("bench".into()), Value::Data(cues.into())])
            .to_bytes()
            .unwrap()
    }

    #[divan::bench(args = [16, 256, 4096])]
    fn decode(bencher: Bencher, rows: u16) {
        bencher
            .with_inputs(|| get_input(rows))
            .bench_refs(|data| {
                divan::black_box(Table::decode(data).unwrap());
            });
    }
}
