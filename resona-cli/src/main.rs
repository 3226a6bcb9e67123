//! resona-cli — offline driver for embedding, reversing and inspecting
//! resonance patterns in 16-bit PCM audio.
//!
//! Commands:
//! - `embed`     : WAV in → pattern-bearing container out
//! - `reverse`   : container in → recovered WAV out
//! - `inspect`   : print session info and pattern strength for a container
//! - `calibrate` : train the adaptive corrector against a reference WAV

mod container;

use std::error::Error;
use std::time::{SystemTime, UNIX_EPOCH};

use resona_core::pattern::{PatternGenerator, PatternSet};
use resona_core::seed::ResonanceSeed;
use resona_engine::{embed, pattern_strength, residual, AdaptiveCorrector, Reverser};

use container::{SessionInfo, TagRecord};

const DEFAULT_INTENSITY: f32 = 0.8;
const DEFAULT_CHUNK: usize = 4096;
const CALIBRATION_STRIDE: usize = 64;
const DEFAULT_EPOCHS: usize = 4;

#[derive(Debug, Default)]
struct Args {
    command: Option<String>,
    input: Option<String>,
    output: Option<String>,
    reference: Option<String>,
    intensity: Option<f32>,
    seed: Option<u64>,
    chunk: Option<usize>,
    epochs: Option<usize>,
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    year: Option<u32>,
}

fn parse_args() -> Args {
    let mut a = Args::default();
    for s in std::env::args().skip(1) {
        if !s.starts_with("--") && a.command.is_none() { a.command = Some(s); continue; }
        if let Some(rest) = s.strip_prefix("--input=")     { a.input     = Some(rest.to_string()); continue; }
        if let Some(rest) = s.strip_prefix("--output=")    { a.output    = Some(rest.to_string()); continue; }
        if let Some(rest) = s.strip_prefix("--reference=") { a.reference = Some(rest.to_string()); continue; }
        if let Some(rest) = s.strip_prefix("--intensity=") { a.intensity = rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--seed=")      { a.seed      = rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--chunk=")     { a.chunk     = rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--epochs=")    { a.epochs    = rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--title=")     { a.title     = Some(rest.to_string()); continue; }
        if let Some(rest) = s.strip_prefix("--artist=")    { a.artist    = Some(rest.to_string()); continue; }
        if let Some(rest) = s.strip_prefix("--album=")     { a.album     = Some(rest.to_string()); continue; }
        if let Some(rest) = s.strip_prefix("--year=")      { a.year      = rest.parse().ok();      continue; }
        eprintln!("[warn] unknown arg: {s}");
    }
    a
}

fn usage() {
    println!("resona-cli — resonance pattern embed/reverse driver\n");
    println!("Usage:");
    println!("  resona-cli embed     --input=in.wav  --output=out.rsn [--intensity=0.8] [--seed=N] [--chunk=4096] [--title=..] [--artist=..] [--album=..] [--year=..]");
    println!("  resona-cli reverse   --input=in.rsn  --output=out.wav");
    println!("  resona-cli inspect   --input=in.rsn");
    println!("  resona-cli calibrate --input=in.rsn  --reference=orig.wav [--output=out.wav] [--epochs=4]");
}

fn required<'a>(opt: &'a Option<String>, flag: &str) -> Result<&'a str, Box<dyn Error>> {
    opt.as_deref()
        .ok_or_else(|| format!("{flag} is required").into())
}

// ------------------------------- WAV plumbing -------------------------------------

fn read_wav(path: &str) -> Result<(Vec<i16>, hound::WavSpec), Box<dyn Error>> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
        return Err(format!(
            "{path}: expected 16-bit integer PCM, got {}-bit {:?}",
            spec.bits_per_sample, spec.sample_format
        )
        .into());
    }
    let samples = reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?;
    Ok((samples, spec))
}

fn write_wav(path: &str, samples: &[i16], info: &SessionInfo) -> Result<(), Box<dyn Error>> {
    let spec = hound::WavSpec {
        channels: info.channels,
        sample_rate: info.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for s in samples {
        writer.write_sample(*s)?;
    }
    writer.finalize()?;
    Ok(())
}

// ------------------------------ Pattern plumbing ----------------------------------

fn regenerate_patterns(info: &SessionInfo, total_samples: usize) -> Result<PatternSet, Box<dyn Error>> {
    let duration =
        total_samples as f32 / (info.sample_rate as f32 * f32::from(info.channels.max(1)));
    let mut generator = PatternGenerator::new(ResonanceSeed::from_u64(info.seed));
    Ok(generator.generate(info.intensity, info.sample_rate, duration)?)
}

// --------------------------------- Commands ---------------------------------------

fn cmd_embed(args: &Args) -> Result<(), Box<dyn Error>> {
    let input = required(&args.input, "--input")?;
    let output = required(&args.output, "--output")?;

    let intensity = args.intensity.unwrap_or(DEFAULT_INTENSITY);
    let chunk = args.chunk.unwrap_or(DEFAULT_CHUNK).max(1);
    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(1, |d| d.as_nanos() as u64)
    });

    let (mut samples, spec) = read_wav(input)?;
    let info = SessionInfo {
        intensity,
        seed,
        chunk_size: chunk as u32,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        tags: TagRecord {
            title: args.title.clone(),
            artist: args.artist.clone(),
            album: args.album.clone(),
            year: args.year,
            genre: None,
            signature: Some(format!("{seed:016x}")),
        },
    };

    let patterns = regenerate_patterns(&info, samples.len())?;
    for p in &patterns {
        tracing::info!(
            frequency = f64::from(p.frequency),
            resonance = f64::from(p.resonance),
            "generated harmonic"
        );
    }

    for (idx, block) in samples.chunks_mut(chunk).enumerate() {
        embed(&patterns, block, idx * chunk);
    }

    std::fs::write(output, container::encode(&samples, &info)?)?;
    println!("embedded {} samples into {output} (seed {seed}, intensity {intensity})", samples.len());
    Ok(())
}

fn cmd_reverse(args: &Args) -> Result<(), Box<dyn Error>> {
    let input = required(&args.input, "--input")?;
    let output = required(&args.output, "--output")?;

    let (mut samples, info) = container::decode(&std::fs::read(input)?)?;
    let patterns = regenerate_patterns(&info, samples.len())?;

    let corrector = AdaptiveCorrector::new();
    let mut reverser = Reverser::new();
    let chunk = (info.chunk_size as usize).max(1);
    for (idx, block) in samples.chunks_mut(chunk).enumerate() {
        reverser.reverse(&patterns, block, idx * chunk, &corrector);
    }

    write_wav(output, &samples, &info)?;
    println!("recovered {} samples into {output}", samples.len());
    Ok(())
}

fn cmd_inspect(args: &Args) -> Result<(), Box<dyn Error>> {
    let input = required(&args.input, "--input")?;
    let (samples, info) = container::decode(&std::fs::read(input)?)?;

    println!("container: {input}");
    println!("  sample rate : {} Hz, {} channel(s)", info.sample_rate, info.channels);
    println!("  samples     : {}", samples.len());
    println!("  intensity   : {}", info.intensity);
    println!("  seed        : {:#x}", info.seed);
    println!("  chunk size  : {}", info.chunk_size);
    if let Some(t) = &info.tags.title {
        println!("  title       : {t}");
    }
    if let Some(a) = &info.tags.artist {
        println!("  artist      : {a}");
    }
    if let Some(s) = &info.tags.signature {
        println!("  signature   : {s}");
    }
    println!("  strength    : {:.4}", pattern_strength(&samples));
    Ok(())
}

fn cmd_calibrate(args: &Args) -> Result<(), Box<dyn Error>> {
    let input = required(&args.input, "--input")?;
    let reference_path = required(&args.reference, "--reference")?;
    let epochs = args.epochs.unwrap_or(DEFAULT_EPOCHS).max(1);

    let (embedded, info) = container::decode(&std::fs::read(input)?)?;
    let (reference, _) = read_wav(reference_path)?;
    let patterns = regenerate_patterns(&info, embedded.len())?;

    let mut corrector = AdaptiveCorrector::new();
    let mut reverser = Reverser::new();
    let chunk = (info.chunk_size as usize).max(1);
    let harmonics = patterns.as_slice();

    let mut recovered = Vec::new();
    for epoch in 0..epochs {
        recovered = embedded.clone();
        for (idx, block) in recovered.chunks_mut(chunk).enumerate() {
            reverser.reverse(&patterns, block, idx * chunk, &corrector);
        }

        // Feed (observed, expected) pairs on a stride, rotating through the
        // harmonic keys so every pattern shares the feedback.
        for (n, (rec, exp)) in recovered
            .iter()
            .zip(reference.iter())
            .step_by(CALIBRATION_STRIDE)
            .enumerate()
        {
            let p = &harmonics[n % harmonics.len()];
            corrector.update(p.key(), f32::from(*rec), f32::from(*exp));
        }

        let report = residual(&reference, &recovered);
        tracing::info!(
            epoch,
            mean_abs = f64::from(report.mean_abs),
            peak_abs = report.peak_abs,
            "calibration epoch finished"
        );
    }

    for p in &patterns {
        println!(
            "{:>6.0} Hz: correction {:.3} (confidence {:.2})",
            p.frequency,
            corrector.correction(p.key()),
            corrector.confidence(p.key())
        );
    }

    if let Some(output) = &args.output {
        write_wav(output, &recovered, &info)?;
        println!("calibrated recovery written to {output}");
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();
    let args = parse_args();

    match args.command.as_deref() {
        Some("embed") => cmd_embed(&args),
        Some("reverse") => cmd_reverse(&args),
        Some("inspect") => cmd_inspect(&args),
        Some("calibrate") => cmd_calibrate(&args),
        _ => {
            usage();
            Ok(())
        }
    }
}
