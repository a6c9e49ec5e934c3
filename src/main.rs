use clap::{Parser, Subcommand};
use display_profiles::{
    codec::encode_profile,
    dbus::MutterBackend,
    menu::{Menu, MenuItem},
    settings::{FileSettings, SettingsStore, KEY_PROFILES},
    Error, ProfileManager,
};
use futures::StreamExt;
use log::{error, info};
use std::error::Error as StdError;
use std::num::NonZeroUsize;

#[derive(Parser)]
#[command(name = "display-profiles", about = "Save and restore monitor layouts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show stored profiles; `*` marks the active one, `-` unusable ones
    List,
    /// Print the live layout in stored-profile form
    Current,
    /// Store the live layout under a name
    Save { name: String },
    /// Apply the profile at a position (1-based)
    Apply { position: NonZeroUsize },
    /// Delete the profile at a position
    Remove { position: NonZeroUsize },
    /// Move a profile one place up
    MoveUp { position: NonZeroUsize },
    /// Move a profile one place down
    MoveDown { position: NonZeroUsize },
    /// Replace one raw field of a profile (0 name, 1 clone, 2.. outputs)
    Edit {
        position: NonZeroUsize,
        field: usize,
        value: String,
    },
    /// Allow raw field edits
    Expert {
        #[arg(long)]
        off: bool,
    },
    /// Follow monitor changes and keep the current layout published
    Watch,
}

fn index(position: NonZeroUsize) -> usize {
    position.get() - 1
}

fn print_menu(menu: &Menu) {
    for item in &menu.items {
        match item {
            MenuItem::Profile(profile) => {
                let marker = match (profile.active, profile.reactive) {
                    (true, _) => '*',
                    (false, true) => ' ',
                    (false, false) => '-',
                };
                println!("{marker} {}. {}", profile.index + 1, profile.label);
            }
            MenuItem::Placeholder(text) | MenuItem::Description(text) => println!("{text}"),
            _ => {}
        }
    }
}

async fn watch(
    manager: &mut ProfileManager<FileSettings>,
    backend: &MutterBackend,
) -> Result<(), Error> {
    let mut changes = Box::pin(backend.monitors_changed().await?);
    let mut reload = tokio::time::interval(std::time::Duration::from_secs(2));
    info!("Watching monitor changes...");
    loop {
        tokio::select! {
            Some(_) = changes.next() => {
                match backend.snapshot().await {
                    Ok(resources) => {
                        if let Err(e) = manager.on_monitors_changed(Box::new(resources)) {
                            error!("Failed to publish the current layout: {e}");
                        }
                    }
                    Err(e) => error!("Failed to read display resources: {e}"),
                }
                info!("Active profile: {:?}", manager.menu().status);
            }
            _ = reload.tick() => {
                // Other processes edit the same settings file.
                let mut keys = manager.settings().subscribe();
                match manager.settings_mut().reload() {
                    Ok(()) => {
                        while let Ok(key) = keys.try_recv() {
                            if key == KEY_PROFILES {
                                manager.on_settings_changed();
                            }
                        }
                    }
                    Err(e) => error!("Failed to reload settings: {e}"),
                }
            }
            else => break,
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn StdError>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut manager = ProfileManager::new(FileSettings::load_or_create()?);
    let connection = zbus::Connection::session().await?;
    let backend = MutterBackend::connect(&connection).await?;
    manager.on_monitors_changed(Box::new(backend.snapshot().await?))?;

    match cli.command {
        Command::List => print_menu(&manager.menu()),
        Command::Current => {
            if let Some(current) = manager.current_profile() {
                println!("{}", encode_profile(current));
            }
        }
        Command::Save { name } => manager.save_current(&name)?,
        Command::Apply { position } => {
            let request = manager.activate(index(position))?;
            let result = backend.apply(&request).await;
            let failed = result.is_err();
            manager.apply_finished(result);
            if failed {
                return Err("display configuration was rejected".into());
            }
        }
        Command::Remove { position } => {
            let removed = manager.remove(index(position))?;
            info!("Removed profile '{}'", removed.name);
        }
        Command::MoveUp { position } => manager.move_up(index(position))?,
        Command::MoveDown { position } => manager.move_down(index(position))?,
        Command::Edit {
            position,
            field,
            value,
        } => manager.edit_field(index(position), field, &value)?,
        Command::Expert { off } => manager.set_expert_mode(!off)?,
        Command::Watch => watch(&mut manager, &backend).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(args: &[&str]) -> Option<usize> {
        let cli = Cli::try_parse_from(args).ok()?;
        match cli.command {
            Command::Remove { position } | Command::Apply { position } => Some(index(position)),
            _ => None,
        }
    }

    #[test]
    fn positions_are_one_based() {
        assert_eq!(position(&["display-profiles", "remove", "1"]), Some(0));
        assert_eq!(position(&["display-profiles", "apply", "3"]), Some(2));
        assert_eq!(position(&["display-profiles", "remove", "0"]), None);
        assert_eq!(position(&["display-profiles", "apply", "0"]), None);
    }

    #[test]
    fn edit_and_expert_arguments() {
        let cli = Cli::try_parse_from(["display-profiles", "edit", "2", "0", "Desk"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Edit { position, field: 0, ref value } if position.get() == 2 && value == "Desk"
        ));
        let cli = Cli::try_parse_from(["display-profiles", "expert", "--off"]).unwrap();
        assert!(matches!(cli.command, Command::Expert { off: true }));
    }
}
