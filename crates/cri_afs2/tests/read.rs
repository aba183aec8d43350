use cri_afs2::{error::Result, write::Afs2WriterOptions, Afs2Archive, Afs2Writer};
use cri_hca::{CipherKind, HeaderWriter, LoopRegion};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

fn stream(sample_rate: u32, block_count: u32) -> HeaderWriter {
    HeaderWriter::builder()
        .channels(2)
        .sample_rate(sample_rate)
        .block_count(block_count)
        .build()
}

fn build_archive(streams: &[Vec<u8>], options: Afs2WriterOptions) -> Result<Vec<u8>> {
    let mut writer = Afs2Writer::new(options);
    for (id, data) in streams.iter().enumerate() {
        writer.push(id as u16 + 100, data.clone());
    }
    writer.to_bytes()
}

#[traced_test]
#[test]
fn one_truncated_entry_does_not_spoil_the_rest() -> Result<()> {
    let mut streams = (1..=10)
        .map(|i| stream(48000, i * 100).to_bytes())
        .collect::<Vec<_>>();
    streams[5].truncate(20);

    let archive = Afs2Archive::decode(&build_archive(&streams, Afs2WriterOptions::default())?)?;

    assert_eq!(archive.len(), 10);
    let invalid = archive
        .entries()
        .iter()
        .filter(|e| !e.is_valid())
        .map(|e| e.index)
        .collect::<Vec<_>>();
    assert_eq!(invalid, vec![5]);
    assert_eq!(archive.entries()[5].header.size, 20);

    let expected = (1..=10)
        .filter(|i| *i != 6)
        .map(|i| (i * 100 * 1024) as f64 / 48000.0)
        .sum::<f64>();
    assert!((archive.duration_secs() - expected).abs() < 1e-6);

    let stats = archive.stats();
    assert_eq!(stats.valid, 9);
    assert_eq!(stats.invalid, 1);
    assert!((stats.duration_secs - expected).abs() < 1e-6);

    Ok(())
}

#[traced_test]
#[test]
fn ranges_ascend_without_overlap() -> Result<()> {
    for (width, alignment) in [(2, 0), (2, 32), (4, 16), (4, 2048)] {
        let streams = [0, 1, 33, 7, 64, 100]
            .map(|len| vec![0x5A; len])
            .to_vec();
        let options = Afs2WriterOptions::builder()
            .offset_width(width)
            .alignment(alignment)
            .build();
        let bytes = build_archive(&streams, options)?;
        let archive = Afs2Archive::decode(&bytes)?;
        let entries = archive.entries();

        for pair in entries.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        for (entry, data) in entries.iter().zip(&streams) {
            assert_eq!(entry.len(), data.len());
            assert_eq!(archive.entry_data(entry.index)?, data.as_slice());
            if alignment > 0 {
                assert_eq!(entry.start % usize::from(alignment), 0);
            }
        }

        let covered = entries.iter().map(|e| e.len()).sum::<usize>();
        let padding = entries
            .windows(2)
            .map(|pair| pair[1].start - pair[0].end)
            .sum::<usize>();
        let first = entries.first().map(|e| e.start).unwrap_or_default();
        let last = entries.last().map(|e| e.end).unwrap_or_default();
        assert_eq!(covered + padding, last - first);
        assert_eq!(last, bytes.len());
    }

    Ok(())
}

#[traced_test]
#[test]
fn statistics() -> Result<()> {
    let streams = vec![
        stream(48000, 10).to_bytes(),
        HeaderWriter {
            channels: 1,
            cipher: Some(CipherKind::Keyed),
            ..stream(44100, 10)
        }
        .to_bytes(),
        HeaderWriter {
            loop_region: Some(LoopRegion {
                start_block: 1,
                end_block: 9,
                count: 0,
            }),
            ..stream(48000, 10)
        }
        .to_bytes(),
        b"not audio".to_vec(),
    ];

    let archive = Afs2Archive::decode(&build_archive(&streams, Afs2WriterOptions::default())?)?;
    let stats = archive.stats();

    assert_eq!(stats.sample_rates, vec![44100, 48000]);
    assert_eq!(stats.channels, vec![1, 2]);
    assert_eq!(stats.valid, 3);
    assert_eq!(stats.invalid, 1);
    assert_eq!(stats.encrypted, 1);
    assert_eq!(stats.looping, 1);
    assert_eq!(archive.entries()[3].id, 103);

    Ok(())
}

#[traced_test]
#[test]
fn empty_archive() -> Result<()> {
    let archive = Afs2Archive::decode(&Afs2Writer::default().to_bytes()?)?;

    assert!(archive.is_empty());
    assert_eq!(archive.stats().duration_secs, 0.0);

    Ok(())
}
