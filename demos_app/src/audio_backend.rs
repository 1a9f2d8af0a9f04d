use crate::scene::BlockSource;
use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait};
use std::sync::{Arc, Mutex};

/// Opens the default output device and streams `create_source`'s output to
/// every channel.
pub fn init_audio<F, S>(create_source: F) -> Result<(cpal::Stream, f32)>
where
    S: BlockSource + 'static,
    F: FnOnce(f32) -> S,
{
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("No output device available"))?;
    let config = device.default_output_config()?;
    let sample_rate = config.sample_rate() as f32;

    let source = create_source(sample_rate);
    let source = Arc::new(Mutex::new(source));

    let err_fn = |err| tracing::error!("an error occurred on stream: {}", err);

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => run_mono::<f32, S>(&device, &config.into(), source, err_fn)?,
        cpal::SampleFormat::I16 => run_mono::<i16, S>(&device, &config.into(), source, err_fn)?,
        cpal::SampleFormat::U16 => run_mono::<u16, S>(&device, &config.into(), source, err_fn)?,
        _ => return Err(anyhow::anyhow!("Unsupported sample format")),
    };

    tracing::info!("output stream open at {} Hz", sample_rate);
    Ok((stream, sample_rate))
}

fn run_mono<T, S>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    source: Arc<Mutex<S>>,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream>
where
    T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>,
    S: BlockSource + 'static,
{
    let channels = config.channels as usize;
    let mut process_buffer = vec![0.0; 512];
    let mut started = false;

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let frames = data.len() / channels;
            if process_buffer.len() < frames {
                process_buffer.resize(frames, 0.0);
            }
            let block = &mut process_buffer[0..frames];

            match source.lock() {
                Ok(mut source) if started => source.fill(block),
                Ok(mut source) => {
                    source.restart(block);
                    started = true;
                }
                Err(_) => block.fill(0.0),
            }

            for (i, frame) in data.chunks_mut(channels).enumerate() {
                let sample = T::from_sample(block[i]);
                for channel_sample in frame.iter_mut() {
                    *channel_sample = sample;
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
