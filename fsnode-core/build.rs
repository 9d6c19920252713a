//! Build script for fsnode-core
//!
//! - Checks device.toml syntax and required keys at compile time
//! - Embeds the values as `BUILD_CONFIG` for the configuration provider
//!
//! Semantic validation (passphrase length, hostname label rules, pin
//! resolution) happens at runtime so the firmware can report exactly which
//! field is wrong.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable selecting an alternative config file
const CONFIG_ENV: &str = "FSNODE_DEVICE_CONFIG";

/// Port used when `[server]` omits one
const DEFAULT_SERVER_PORT: i64 = 80;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DeviceToml {
    #[serde(default)]
    ap: ApSection,
    station: StationSection,
    #[serde(default)]
    server: ServerSection,
    network: NetworkSection,
    gpio: GpioSection,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ApSection {
    #[serde(default)]
    secret: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StationSection {
    ssid: String,
    #[serde(default)]
    password: String,
    security: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerSection {
    #[serde(default = "default_port")]
    port: i64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERVER_PORT,
        }
    }
}

fn default_port() -> i64 {
    DEFAULT_SERVER_PORT
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NetworkSection {
    hostname: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct GpioSection {
    pin: String,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed={}", CONFIG_ENV);

    let config_path = config_path();
    println!("cargo:rerun-if-changed={}", config_path.display());

    let config = load_config(&config_path);
    check_strings(&config);
    let security = security_expr(config.station.security.as_deref());

    let code = format!(
        r#"
/// Device configuration embedded from `{path}` at build time (unvalidated)
pub const BUILD_CONFIG: RawConfig<'static> = RawConfig {{
    ap_secret: {ap_secret:?},
    sta_ssid: {sta_ssid:?},
    sta_password: {sta_password:?},
    sta_security: {security},
    server_port: {port},
    hostname: {hostname:?},
    io_pin: {pin:?},
}};
"#,
        path = config_path.file_name().unwrap_or_default().to_string_lossy(),
        ap_secret = config.ap.secret,
        sta_ssid = config.station.ssid,
        sta_password = config.station.password,
        security = security,
        port = config.server.port,
        hostname = config.network.hostname,
        pin = config.gpio.pin,
    );

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set"));
    fs::write(out_dir.join("build_config.rs"), code).expect("failed to write build_config.rs");
}

/// Resolve the config file, honouring the override variable
fn config_path() -> PathBuf {
    match env::var(CONFIG_ENV) {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => {
            let manifest_dir =
                PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set"));
            manifest_dir.join("device.toml")
        }
    }
}

/// Read and parse the config file, failing the build with a readable box
fn load_config(path: &Path) -> DeviceToml {
    if !path.exists() {
        fail(
            "device.toml not found!",
            &[
                format!("Looked for {}", path.display()),
                format!("Create it or point {} at one.", CONFIG_ENV),
            ],
        );
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read device.toml", &[e.to_string()]),
    };

    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => fail(
            "Invalid device.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    }
}

/// Reject values the runtime parser cannot express
///
/// Escape sequences are not supported in flash-provisioned text, so a value
/// containing a backslash or control character fails here too.
fn check_strings(config: &DeviceToml) {
    let values = [
        ("ap.secret", &config.ap.secret),
        ("station.ssid", &config.station.ssid),
        ("station.password", &config.station.password),
        ("network.hostname", &config.network.hostname),
        ("gpio.pin", &config.gpio.pin),
    ];
    for (key, value) in values {
        if value.contains('\\') || value.chars().any(char::is_control) {
            fail(
                "Unsupported string value",
                &[
                    format!("{} contains a backslash or control character", key),
                    "Escape sequences are not supported.".to_string(),
                ],
            );
        }
    }
}

/// Map the optional `station.security` value onto a `SecurityMode` expression
fn security_expr(security: Option<&str>) -> &'static str {
    match security {
        None => "None",
        Some("open") => "Some(SecurityMode::Open)",
        Some("wpa2") => "Some(SecurityMode::Wpa2Personal)",
        Some(other) => fail(
            "Invalid station security mode",
            &[format!("'{}' must be 'open' or 'wpa2'", other)],
        ),
    }
}

fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        format_error_lines(lines)
    );
}

/// Format error message lines with box drawing
fn format_error_lines(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.clone()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
