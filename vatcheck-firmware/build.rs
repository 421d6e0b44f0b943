//! Build script for vatcheck-firmware
//!
//! - Sets up linker search paths and scripts for memory.x
//! - Validates console.toml and compiles it into `console_config.rs`

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Upper bound on the NTC sample window (matches vatcheck-core)
const MAX_NTC_SAMPLES: u8 = 64;

fn main() {
    setup_linker();
    let config = load_config();
    validate_config(&config);
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConsoleToml {
    timing: TimingToml,
    ntc: NtcToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TimingToml {
    poll_interval_ms: u32,
    fast_poll_interval_ms: u32,
    refresh_interval_ms: u32,
    fast_refresh_interval_ms: u32,
    yield_ms: u32,
    fast_yield_ms: u32,
    reply_grace_ms: u32,
    reply_timeout_ms: u32,
    boot_delay_ms: u32,
    stale_after_ms: u32,
    button_lockout_ms: u32,
    fan_channel_gap_ms: u32,
    motor_enable_settle_ms: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NtcToml {
    min_temp: f32,
    max_temp: f32,
    max_step: f32,
    max_spread: f32,
    target_samples: u8,
    timeout_ms: u32,
}

/// Read and parse console.toml
fn load_config() -> ConsoleToml {
    // Re-run if console.toml changes
    println!("cargo:rerun-if-changed=console.toml");

    let config_path = Path::new("console.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: console.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a console.toml configuration file.        ║\n\
            ║  Please create one in the vatcheck-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read console.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid console.toml                                     ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Degrees C to tenths, rounded
fn tenths(value: f32) -> i32 {
    (value * 10.0).round() as i32
}

/// Check value ranges the console cannot run with
fn validate_config(config: &ConsoleToml) {
    let mut errors = Vec::new();

    let t = &config.timing;
    let intervals = [
        ("poll_interval_ms", t.poll_interval_ms),
        ("fast_poll_interval_ms", t.fast_poll_interval_ms),
        ("refresh_interval_ms", t.refresh_interval_ms),
        ("fast_refresh_interval_ms", t.fast_refresh_interval_ms),
        ("yield_ms", t.yield_ms),
        ("fast_yield_ms", t.fast_yield_ms),
        ("reply_timeout_ms", t.reply_timeout_ms),
    ];
    for (name, value) in intervals {
        if value == 0 {
            errors.push(format!("[timing] {} must be greater than 0", name));
        }
    }

    let n = &config.ntc;
    if tenths(n.min_temp) >= tenths(n.max_temp) {
        errors.push("[ntc] min_temp must be below max_temp".to_string());
    }
    if n.max_step < 0.0 {
        errors.push("[ntc] max_step cannot be negative".to_string());
    }
    if n.max_spread < 0.0 {
        errors.push("[ntc] max_spread cannot be negative".to_string());
    }
    if n.target_samples == 0 || n.target_samples > MAX_NTC_SAMPLES {
        errors.push(format!("[ntc] target_samples must be 1-{}", MAX_NTC_SAMPLES));
    }
    if n.timeout_ms == 0 {
        errors.push("[ntc] timeout_ms must be greater than 0".to_string());
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid console configuration                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=console.toml validated successfully");
}

/// Write `console_config.rs` into OUT_DIR
fn generate_config(config: &ConsoleToml) {
    let t = &config.timing;
    let n = &config.ntc;

    let source = format!(
        "pub const CONSOLE_CONFIG: ConsoleConfig = ConsoleConfig {{
    timing: TimingConfig {{
        poll_interval_ms: {},
        fast_poll_interval_ms: {},
        refresh_interval_ms: {},
        fast_refresh_interval_ms: {},
        yield_ms: {},
        fast_yield_ms: {},
        reply_grace_ms: {},
        reply_timeout_ms: {},
        boot_delay_ms: {},
        stale_after_ms: {},
        button_lockout_ms: {},
        fan_channel_gap_ms: {},
        motor_enable_settle_ms: {},
    }},
    ntc: NtcTestConfig {{
        min_temp: Deci::from_tenths({}),
        max_temp: Deci::from_tenths({}),
        max_step: Deci::from_tenths({}),
        max_spread: Deci::from_tenths({}),
        target_samples: {},
        timeout_ms: {},
    }},
}};
",
        t.poll_interval_ms,
        t.fast_poll_interval_ms,
        t.refresh_interval_ms,
        t.fast_refresh_interval_ms,
        t.yield_ms,
        t.fast_yield_ms,
        t.reply_grace_ms,
        t.reply_timeout_ms,
        t.boot_delay_ms,
        t.stale_after_ms,
        t.button_lockout_ms,
        t.fan_channel_gap_ms,
        t.motor_enable_settle_ms,
        tenths(n.min_temp),
        tenths(n.max_temp),
        tenths(n.max_step),
        tenths(n.max_spread),
        n.target_samples,
        n.timeout_ms,
    );

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("console_config.rs"), source).unwrap();
}
