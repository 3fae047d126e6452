//! PXE Config Service
//!
//! HTTP endpoint the TFTP service calls to generate PXELINUX configs.
//! The TFTP side captures arch, subarch and file name from the request
//! path and passes them along here; machine identity, when the caller
//! has resolved one, arrives as `system_id` and `hostname`. Without an
//! identity the config boots the machine into enlistment.

use std::env;

use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use boot_config::kernel_opts::{
    compose_kernel_command_line, BootPurpose, BootSettings, MachineIdentity, DEFAULT_SUBARCH,
};
use boot_config::pxe::render_pxe_config;
use boot_config::tftppath::compose_image_path;

#[derive(Debug, Clone)]
struct AppState {
    settings: BootSettings,
}

#[derive(Debug, Default, Deserialize)]
struct PxeConfigQuery {
    arch: String,
    #[serde(default)]
    subarch: Option<String>,
    /// Requested file name; carried for logging only.
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    menutitle: Option<String>,
    #[serde(default)]
    kernelimage: Option<String>,
    #[serde(default)]
    append: Option<String>,
    #[serde(default)]
    system_id: Option<String>,
    #[serde(default)]
    hostname: Option<String>,
    #[serde(default)]
    purpose: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

async fn pxe_config(
    State(state): State<AppState>,
    Query(query): Query<PxeConfigQuery>,
) -> Result<([(header::HeaderName, &'static str); 1], String), (StatusCode, String)> {
    if query.arch.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "arch is required".to_string()));
    }
    let subarch = non_empty(query.subarch).unwrap_or_else(|| DEFAULT_SUBARCH.to_string());
    let purpose: BootPurpose = non_empty(query.purpose)
        .unwrap_or_else(|| "install".to_string())
        .parse()
        .map_err(|err: String| (StatusCode::BAD_REQUEST, err))?;

    let machine = match (non_empty(query.system_id), non_empty(query.hostname)) {
        (Some(system_id), Some(hostname)) => Some(MachineIdentity {
            system_id,
            hostname,
        }),
        _ => None,
    };

    info!(
        arch = %query.arch,
        subarch = %subarch,
        name = query.name.as_deref().unwrap_or("default"),
        purpose = %purpose,
        known = machine.is_some(),
        "generating PXE config"
    );

    let append = match non_empty(query.append) {
        Some(append) => append,
        None => compose_kernel_command_line(
            machine.as_ref(),
            &query.arch,
            &subarch,
            purpose,
            &state.settings,
        ),
    };
    let kernelimage = non_empty(query.kernelimage).unwrap_or_else(|| {
        format!(
            "{}/linux",
            compose_image_path(&query.arch, &subarch, &state.settings.release, purpose)
        )
    });
    let menutitle = query.menutitle.unwrap_or_default();

    let config = render_pxe_config(&menutitle, &kernelimage, &append)
        .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], config))
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/pxeconfig", get(pxe_config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    info!("Starting PXE config service");

    // Load configuration from environment variables
    let listen = env::var("PXE_CONFIG_LISTEN").unwrap_or_else(|_| "0.0.0.0:5248".to_string());
    let metadata_url =
        env::var("MAAS_METADATA_URL").unwrap_or_else(|_| "http://localhost/metadata".to_string());
    let release = env::var("MAAS_RELEASE").unwrap_or_else(|_| "precise".to_string());

    info!("Configuration:");
    info!("  Listen: {}", listen);
    info!("  Metadata URL: {}", metadata_url);
    info!("  Release: {}", release);

    let state = AppState {
        settings: BootSettings {
            release,
            metadata_url,
        },
    };

    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .with_context(|| format!("failed to bind {listen}"))?;
    info!("Serving on {}", listen);
    axum::serve(listener, app(state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState {
            settings: BootSettings {
                release: "precise".to_string(),
                metadata_url: "http://maas.example.com/metadata".to_string(),
            },
        }
    }

    fn query(arch: &str) -> PxeConfigQuery {
        PxeConfigQuery {
            arch: arch.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn unknown_machine_boots_into_enlistment() {
        let (_headers, config) = pxe_config(State(state()), Query(query("amd64")))
            .await
            .unwrap();
        assert!(config.contains("KERNEL amd64/generic/precise/install/linux"));
        assert!(config.contains("hostname=maas-enlist"));
        assert!(config.contains("url=http://maas.example.com/metadata/latest/enlist-preseed/"));
    }

    #[tokio::test]
    async fn known_machine_gets_its_identity() {
        let mut q = query("armhf");
        q.subarch = Some("highbank".to_string());
        q.system_id = Some("node-89ab".to_string());
        q.hostname = Some("coleman".to_string());
        q.purpose = Some("commissioning".to_string());

        let (_headers, config) = pxe_config(State(state()), Query(q)).await.unwrap();
        assert!(config.contains("KERNEL armhf/highbank/precise/commissioning/linux"));
        assert!(config.contains("hostname=coleman"));
        assert!(config.contains("by-id/node-89ab/?op=get_preseed"));
    }

    #[tokio::test]
    async fn explicit_append_wins_over_the_composer() {
        let mut q = query("i386");
        q.append = Some("console=ttyS0".to_string());
        let (_headers, config) = pxe_config(State(state()), Query(q)).await.unwrap();
        assert!(config.contains("APPEND console=ttyS0\n"));
        assert!(!config.contains("hostname=maas-enlist"));
    }

    #[tokio::test]
    async fn bad_purpose_is_a_client_error() {
        let mut q = query("amd64");
        q.purpose = Some("netboot".to_string());
        let (status, _message) = pxe_config(State(state()), Query(q)).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_arch_is_a_client_error() {
        let (status, message) = pxe_config(State(state()), Query(query("")))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("arch"));
    }
}
