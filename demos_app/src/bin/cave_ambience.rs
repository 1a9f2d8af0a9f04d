use anyhow::Result;
use bachelordsp_core::synthesis::advanced_noise::NoiseSettings;
use bachelordsp_core::synthesis::noise::NoiseColor;
use bachelordsp_demos::audio_backend::init_audio;
use bachelordsp_demos::scene::{ChainSettings, NoiseScene};
use cpal::traits::StreamTrait;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

// Gain steps in dB, applied once per second.
const SWELL: [f32; 8] = [-24.0, -18.0, -12.0, -6.0, -3.0, -6.0, -12.0, -18.0];

fn main() -> Result<()> {
    bachelordsp_demos::init_tracing();

    let noise = NoiseSettings {
        seed: 42,
        color: NoiseColor::Brown,
        gain: SWELL[0],
        ..NoiseSettings::default()
    };
    let chain = ChainSettings {
        amplitude: 0.4,
        notch_hz: 50.0,
        notch_bandwidth: 0.95,
    };

    let (tx, rx) = mpsc::channel();
    let (stream, sample_rate) = init_audio(move |sample_rate| {
        let scene = NoiseScene::new(&noise, &chain, sample_rate);
        println!("Signal Chain:\n{}", scene.graph());
        let _ = tx.send(scene.inputs());
        scene
    })?;
    let inputs = rx.recv()?;

    println!("Playing cave ambience at {}Hz...", sample_rate);
    stream.play()?;

    for (step, gain) in SWELL.iter().cycle().take(16).enumerate() {
        inputs.gain.set(*gain);
        if step == 8 {
            tracing::info!("switching to a new rumble");
            inputs.seed.set(43);
        }
        thread::sleep(Duration::from_secs(1));
    }

    Ok(())
}
