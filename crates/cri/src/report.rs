//! Console output shared by the commands.

use cri_acb::{ArchivePair, CueCatalog, Member, ScanReport};
use cri_afs2::Afs2Archive;
use cri_hca::HcaHeader;
use itertools::Itertools;
use owo_colors::OwoColorize;

const RULE: usize = 70;

/// `MM:SS.mmm`
pub fn duration(seconds: f64) -> String {
    let millis = (seconds * 1000.0).round() as u64;
    format!(
        "{:02}:{:02}.{:03}",
        millis / 60_000,
        millis / 1000 % 60,
        millis % 1000
    )
}

/// Digits grouped by thousands, `1,234,567`
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .join(",")
}

fn banner(title: impl std::fmt::Display) {
    println!("\n{}", "=".repeat(RULE));
    println!("{title}");
    println!("{}", "=".repeat(RULE));
}

fn error(what: &str, error: impl std::fmt::Display) {
    println!("\n{} {what} Error: {error}", "[ERROR]".red());
}

pub fn catalog(catalog: &CueCatalog) {
    println!("\n[ACB Metadata]");
    println!("   Name: {}", catalog.name);
    if catalog.cue_count() > 0 {
        println!("   Cue Names: {}", catalog.cue_count());
    }
    if catalog.waveform_count() > 0 {
        println!("   Waveforms: {}", catalog.waveform_count());
    }
    if catalog.has_memory_awb() {
        println!("   Embedded AWB: {} bytes", thousands(catalog.memory_awb_size()));
    }
    if !catalog.stream_awb_names.is_empty() {
        println!("   External AWBs: {}", catalog.stream_awb_names.join(", "));
    }
}

pub fn tracks(archive: &Afs2Archive) {
    println!(
        "\n   {:>4} {:>6} {:>2} {:>10} {:>7} {:>10} {:>5} {:>4}",
        "#", "Rate", "Ch", "Duration", "Blocks", "Size", "Loop", "Enc"
    );
    println!(
        "   {} {} {} {} {} {} {} {}",
        "-".repeat(4),
        "-".repeat(6),
        "-".repeat(2),
        "-".repeat(10),
        "-".repeat(7),
        "-".repeat(10),
        "-".repeat(5),
        "-".repeat(4)
    );

    for entry in archive.entries() {
        let header = &entry.header;
        match &header.error {
            None => {
                let looping = if header.has_loop() { "Yes" } else { "-" };
                let cipher = if header.is_encrypted() {
                    format!("T{}", header.cipher.code())
                } else {
                    "-".to_string()
                };
                println!(
                    "   {:>4} {:>6} {:>2} {:>10} {:>7} {:>10} {:>5} {:>4}",
                    entry.index + 1,
                    header.sample_rate,
                    header.channels,
                    duration(header.duration_secs()),
                    header.block_count,
                    thousands(header.size),
                    looping,
                    cipher
                );
            }
            Some(error) => {
                println!(
                    "   {:>4} {} - {error}",
                    entry.index + 1,
                    format!("{:>6}", "ERROR").red()
                );
            }
        }
    }
}

pub fn archive(archive: &Afs2Archive, verbose: bool) {
    let header = archive.header();

    println!("\n[AWB Metadata]");
    println!("   Format: AFS2 (version {})", header.version);
    println!("   Tracks: {}", archive.len());
    println!("   Alignment: {} bytes", header.alignment);
    if header.subkey > 0 {
        println!("   Embedded Key: 0x{:04X}", header.subkey);
    }
    println!("   Total Duration: {}", duration(archive.duration_secs()));

    if verbose && !archive.is_empty() {
        tracks(archive);
    }

    let stats = archive.stats();
    if stats.valid == 0 {
        return;
    }

    println!("\n   [Summary]");
    println!(
        "      Sample Rates: {}",
        stats.sample_rates.iter().map(|r| format!("{r} Hz")).join(", ")
    );
    println!(
        "      Channel Configs: {}",
        stats.channels.iter().map(|c| format!("{c}ch")).join(", ")
    );
    if stats.encrypted > 0 {
        println!("      Encrypted: {}/{} tracks", stats.encrypted, stats.valid);
    }
    if stats.looping > 0 {
        println!("      Looping: {}/{} tracks", stats.looping, stats.valid);
    }
    if stats.invalid > 0 {
        println!("      Unreadable: {} tracks", stats.invalid.to_string().red());
    }
}

pub fn pair(pair: &ArchivePair, verbose: bool) {
    banner(format!("[Archive] {}", pair.base_name.bold()));

    if let Some(member) = &pair.catalog {
        match &member.decoded {
            Ok(decoded) => catalog(decoded),
            Err(e) => error("ACB", e),
        }
    }

    if let Some(member) = &pair.archive {
        match &member.decoded {
            Ok(decoded) => archive(decoded, verbose),
            Err(e) => error("AWB", e),
        }
    }

    let cue_names = pair
        .catalog
        .as_ref()
        .and_then(Member::ok)
        .map(|c| c.cue_names.as_slice())
        .unwrap_or_default();
    if verbose && !cue_names.is_empty() {
        println!("\n   [Cue Names]");
        for (i, name) in cue_names.iter().enumerate() {
            println!("      {:>4}: {name}", i + 1);
        }
    }
}

pub fn summary(report: &ScanReport) {
    banner("OVERALL SUMMARY");
    println!("   Archives found: {}", report.archive_count());
    println!("   Total tracks: {}", report.total_tracks());
    println!("   Total duration: {}", duration(report.total_duration_secs()));
    if !report.skipped.is_empty() {
        println!("   Unreadable files: {}", report.skipped.len().to_string().red());
    }
}

pub fn header(header: &HcaHeader) {
    println!("\n[HCA Header]");
    println!("   Size: {} bytes", thousands(header.size));

    if let Some(e) = &header.error {
        error("HCA", e);
        return;
    }

    println!("   Version: {}.{}", header.version >> 8, header.version & 0xFF);
    println!("   Channels: {}", header.channels);
    println!("   Sample Rate: {} Hz", header.sample_rate);
    println!("   Blocks: {} x {} bytes", header.block_count, header.block_size);
    println!("   Samples: {}", header.total_samples());
    println!("   Duration: {}", duration(header.duration_secs()));
    if let Some(region) = header.loop_region {
        println!(
            "   Loop: samples {}..{} (count {})",
            region.start_sample(),
            region.end_sample(),
            region.count
        );
    }
    if header.is_encrypted() {
        println!(
            "   Cipher: {} (type {})",
            header.cipher.yellow(),
            header.cipher.code()
        );
    }
    if header.volume != 1.0 {
        println!("   Volume: {}", header.volume);
    }
    if !header.comment.is_empty() {
        println!("   Comment: {}", header.comment);
    }
}

#[cfg(test)]
mod test {
    use crate::report::{duration, thousands};

    #[test]
    fn durations() {
        assert_eq!(duration(0.0), "00:00.000");
        assert_eq!(duration(61.5), "01:01.500");
        assert_eq!(duration(3599.999), "59:59.999");
        assert_eq!(duration(6000.25), "100:00.250");
        assert_eq!(duration(59.9996), "01:00.000");
        assert_eq!(duration(119.9999), "02:00.000");
    }

    #[test]
    fn grouping() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }
}
