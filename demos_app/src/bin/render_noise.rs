use anyhow::{bail, Result};
use bachelordsp_core::synthesis::advanced_noise::NoiseSettings;
use bachelordsp_core::synthesis::noise::{NoiseColor, GREEN_STANDARD_BANDWIDTH};
use bachelordsp_demos::scene::{BlockSource, ChainSettings, NoiseScene};
use std::env;

const SAMPLE_RATE: u32 = 44100;
const BLOCK_SIZE: usize = 512;

fn parse_color(name: &str) -> Result<NoiseColor> {
    Ok(match name {
        "white" => NoiseColor::White,
        "pink" => NoiseColor::Pink,
        "brown" => NoiseColor::Brown,
        "green" => NoiseColor::Green,
        other => bail!("unknown noise colour '{}'", other),
    })
}

fn render(color: NoiseColor, seconds: f32, path: &str) -> Result<()> {
    let noise = NoiseSettings {
        seed: 7,
        color,
        bandwidth: GREEN_STANDARD_BANDWIDTH,
        ..NoiseSettings::default()
    };
    let mut scene = NoiseScene::new(&noise, &ChainSettings::default(), SAMPLE_RATE as f32);

    let wav_spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, wav_spec)?;

    let mut block = vec![0.0; BLOCK_SIZE];
    scene.restart(&mut block);

    let mut remaining = (seconds * SAMPLE_RATE as f32) as usize;
    while remaining > 0 {
        let frames = remaining.min(BLOCK_SIZE);
        scene.fill(&mut block[..frames]);
        for &sample in &block[..frames] {
            writer.write_sample(sample)?;
        }
        remaining -= frames;
    }
    writer.finalize()?;

    tracing::info!("wrote {:.1}s of {:?} noise to {}", seconds, color, path);
    Ok(())
}

fn main() -> Result<()> {
    bachelordsp_demos::init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let seconds = match args.get(1) {
        Some(s) => s.parse::<f32>()?,
        None => 5.0,
    };

    match args.first() {
        Some(name) => {
            let color = parse_color(name)?;
            render(color, seconds, &format!("{}_noise.wav", name))?;
        }
        None => {
            for name in ["white", "pink", "brown", "green"] {
                render(parse_color(name)?, seconds, &format!("{}_noise.wav", name))?;
            }
        }
    }

    Ok(())
}
