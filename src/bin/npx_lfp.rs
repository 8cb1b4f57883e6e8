/// npx-lfp: read a SpikeGLX LF recording, demultiplex it into shank LFP,
/// estimate the merged CSD and optionally one wavelet band, and write every
/// stage to a safetensors file.
///
/// Output keys:
///   lfp           [4, T, C/4]   f64  per-shank LFP after CAR + band filters
///   shank_csd     [4, T, C/4]   f64  per-shank CSD, z-scored per shank
///   csd           [T, C/2]      f64  pair sums interleaved onto the 20 µm grid
///   wavelet_re    [T, C/2]      f64  real part of the CSD wavelet band (--wavelet-hz)
///   wavelet_im    [T, C/2]      f64  imaginary part
///   start         [1]           i64  first sample of the processed window
///   sample_rate   [1]           f64
use anyhow::{bail, Context, Result};
use clap::Parser;
use ndarray::Axis;
use std::path::PathBuf;

use npx_lfp::{
    io::StWriter,
    spikeglx::{meta_path_for, Meta, RawRecording},
    ConvolutionCwt, CsdEngine, PipelineConfig, StandardCsd, WaveletEngine, WaveletTemplate,
    merge_shank_pairs, neuropixels_lfp,
};

#[derive(Parser, Debug)]
#[command(name = "npx-lfp", about = "Neuropixels multi-shank LFP / CSD pipeline")]
struct Args {
    /// SpikeGLX `.lf.bin` file; the `.meta` next to it is read too.
    #[arg(long)]
    input: PathBuf,

    /// Metadata file, if not next to the binary.
    #[arg(long)]
    meta: Option<PathBuf>,

    /// Output safetensors path.
    #[arg(long)]
    output: PathBuf,

    /// First sample to process.
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// One past the last sample to process (default: end of file).
    #[arg(long)]
    end: Option<usize>,

    /// Sampling rate in Hz (default: from metadata, else 2500).
    #[arg(long)]
    sample_rate: Option<f64>,

    /// Highpass cutoff (Hz).
    #[arg(long, default_value_t = 1.0)]
    highpass: f64,

    /// Lowpass cutoff (Hz).
    #[arg(long, default_value_t = 300.0)]
    lowpass: f64,

    /// Butterworth order.
    #[arg(long, default_value_t = npx_lfp::DEFAULT_ORDER)]
    order: usize,

    /// Electrode pitch along a shank (µm).
    #[arg(long, default_value_t = npx_lfp::DEFAULT_STEP_UM)]
    step_um: f64,

    /// Also write one wavelet band of the CSD centred on this frequency (Hz).
    #[arg(long)]
    wavelet_hz: Option<f64>,

    /// Wavelet template.
    #[arg(long, default_value = "cmor1.5-1.0")]
    wavelet: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // ── 1. Map recording ───────────────────────────────────────────────────
    let t_open = now();
    let meta_path = args.meta.clone().unwrap_or_else(|| meta_path_for(&args.input));
    let meta = Meta::from_path(&meta_path)
        .with_context(|| format!("reading metadata {}", meta_path.display()))?;
    let raw = RawRecording::open_with_meta(&args.input, meta)
        .with_context(|| format!("mapping {}", args.input.display()))?;
    let end = args.end.unwrap_or(raw.n_samples());
    if args.start >= end {
        bail!("empty window {}..{} ({} samples in file)", args.start, end, raw.n_samples());
    }
    let window = raw.read_slice(args.start, end).context("reading sample window")?;
    let ms_open = t_open.elapsed().as_secs_f64() * 1000.0;

    let sample_rate = match (args.sample_rate, raw.sample_rate()) {
        (Some(fs), _) => fs,
        (None, Some(fs)) => fs,
        (None, None) => {
            log::warn!("no sample rate in metadata, assuming 2500 Hz");
            PipelineConfig::default().sample_rate
        }
    };
    let cfg = PipelineConfig {
        sample_rate,
        highpass_hz: args.highpass,
        lowpass_hz: args.lowpass,
        filter_order: args.order,
        step_um: args.step_um,
    };
    log::info!(
        "{} ch x {} samples ({}..{}) @ {} Hz",
        raw.n_channels(), window.nrows(), args.start, end, sample_rate
    );
    raw.close();

    // ── 2. Demultiplex + filter ────────────────────────────────────────────
    let t_lfp = now();
    let lfp = neuropixels_lfp(&window, &cfg).context("demultiplexing shanks")?;
    let ms_lfp = t_lfp.elapsed().as_secs_f64() * 1000.0;

    // ── 3. CSD ─────────────────────────────────────────────────────────────
    let t_csd = now();
    let shank_csd = CsdEngine::<StandardCsd>::default()
        .shank_csd(&lfp, cfg.step_um)
        .context("estimating per-shank CSD")?;
    let csd = merge_shank_pairs(&shank_csd).context("merging shank pairs")?;
    let ms_csd = t_csd.elapsed().as_secs_f64() * 1000.0;

    // ── 4. Wavelet band (optional) ─────────────────────────────────────────
    let t_wav = now();
    let wavelet = match args.wavelet_hz {
        Some(hz) => {
            let template: WaveletTemplate = args.wavelet.parse()?;
            let coeffs = WaveletEngine::<ConvolutionCwt>::default()
                .wavelet_transform(&csd, sample_rate, hz, &template, Axis(0))
                .with_context(|| format!("{template} band at {hz} Hz"))?;
            Some(coeffs)
        }
        None => None,
    };
    let ms_wav = t_wav.elapsed().as_secs_f64() * 1000.0;

    log::info!(
        "timing: open={ms_open:.1}ms lfp={ms_lfp:.1}ms csd={ms_csd:.1}ms wavelet={ms_wav:.1}ms"
    );
    log::info!("lfp {:?} -> csd {:?}", lfp.dim(), csd.dim());

    // ── 5. Write output ────────────────────────────────────────────────────
    let mut w = StWriter::new();
    w.add_f64_array("lfp", &lfp);
    w.add_f64_array("shank_csd", &shank_csd);
    w.add_f64_array("csd", &csd);
    if let Some(c) = &wavelet {
        w.add_f64_array("wavelet_re", &c.mapv(|v| v.re));
        w.add_f64_array("wavelet_im", &c.mapv(|v| v.im));
    }
    let start = i64::try_from(args.start).context("window start exceeds i64")?;
    w.add_i64("start", &[start], &[1]);
    w.add_f64("sample_rate", &[sample_rate], &[1]);
    w.write(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;

    Ok(())
}

/// Return `std::time::Instant::now()` (used for internal timing).
#[inline(always)]
fn now() -> std::time::Instant { std::time::Instant::now() }
