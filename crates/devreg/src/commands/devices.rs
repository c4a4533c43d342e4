//! Device command handlers.

use tabled::Tabled;
use tracing::info;

use devreg_core::{CreateDeviceRequest, Device, UpdateDeviceRequest};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Brand")]
    brand: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Version")]
    version: u64,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.name.clone(),
            brand: d.brand.clone(),
            state: d.state.to_string(),
            created: d.creation_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            version: d.version,
        }
    }
}

fn detail(d: &Device, color: bool) -> String {
    [
        format!("ID:       {}", d.id),
        format!("Name:     {}", d.name),
        format!("Brand:    {}", d.brand),
        format!("State:    {}", output::state_label(d.state, color)),
        format!("Created:  {}", d.creation_time.to_rfc3339()),
        format!("Version:  {}", d.version),
    ]
    .join("\n")
}

fn print_device(
    device: &Device,
    global: &GlobalOpts,
    settings: &Settings,
) -> Result<(), CliError> {
    let color = output::should_color(settings.color);
    let out = output::render_single(
        settings.output,
        device,
        |d| detail(d, color),
        |d| d.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn print_devices(
    devices: &[Device],
    global: &GlobalOpts,
    settings: &Settings,
) -> Result<(), CliError> {
    let out = output::render_list(
        settings.output,
        devices,
        |d| DeviceRow::from(d),
        |d| d.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: DevicesArgs,
    global: &GlobalOpts,
    settings: &Settings,
) -> Result<(), CliError> {
    let color = output::should_color(settings.color);

    match args.command {
        DevicesCommand::Create { name, brand, state } => {
            let mut lock = util::lock_store(settings)?;
            let snapshot = util::acquire(&mut lock)?;
            let registry = util::open_locked(&snapshot, settings)?;
            let device = registry
                .create(CreateDeviceRequest { name, brand, state })
                .await?;
            util::persist(&registry, &snapshot)?;
            drop(snapshot);
            info!(device_id = %device.id, "device created");
            print_device(&device, global, settings)?;
            output::print_note(&format!("Created device {}", device.id), global.quiet, color);
            Ok(())
        }

        DevicesCommand::Get { id } => {
            let device = util::open_registry(settings)?.get(&id).await?;
            print_device(&device, global, settings)
        }

        DevicesCommand::List { brand, state } => {
            let registry = util::open_registry(settings)?;
            let devices = match (brand, state) {
                (Some(brand), _) => registry.list_by_brand(&brand).await?,
                (None, Some(state)) => registry.list_by_state(state).await?,
                (None, None) => registry.list().await?,
            };
            print_devices(&devices, global, settings)
        }

        DevicesCommand::Update {
            id,
            name,
            brand,
            state,
            from_file,
        } => {
            let from_flags = UpdateDeviceRequest { name, brand, state };
            let request = match from_file {
                Some(ref path) => util::read_update_file(path)?.merged_with(from_flags),
                None => from_flags,
            };
            if request == UpdateDeviceRequest::default() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "specify at least one of --name, --brand, --state or --from-file"
                        .into(),
                });
            }

            let mut lock = util::lock_store(settings)?;
            let snapshot = util::acquire(&mut lock)?;
            let registry = util::open_locked(&snapshot, settings)?;
            let device = registry.update(&id, request).await?;
            util::persist(&registry, &snapshot)?;
            drop(snapshot);
            info!(device_id = %device.id, version = device.version, "device updated");
            print_device(&device, global, settings)?;
            output::print_note(
                &format!("Updated device {} (version {})", device.id, device.version),
                global.quiet,
                color,
            );
            Ok(())
        }

        DevicesCommand::Delete { id } => {
            // Fail fast on unknown ids before prompting. The prompt runs
            // without the writer lock; the delete re-reads under it.
            let current = util::open_registry(settings)?.get(&id).await?;
            if !current.is_in_use()
                && !util::confirm(
                    &format!("Delete device {} ({})?", current.name, id),
                    "devices delete",
                    global.yes,
                )?
            {
                return Ok(());
            }
            let mut lock = util::lock_store(settings)?;
            let snapshot = util::acquire(&mut lock)?;
            let registry = util::open_locked(&snapshot, settings)?;
            registry.delete(&id).await?;
            util::persist(&registry, &snapshot)?;
            drop(snapshot);
            info!(device_id = %id, "device deleted");
            output::print_note(&format!("Deleted device {id}"), global.quiet, color);
            Ok(())
        }
    }
}
