//! Build and launch extractor commands.
//!
//! The launcher turns a stream entry plus the global settings into the fixed
//! command shape the extractor CLI expects:
//!
//! ```text
//! <extractor> [extractor_args...] <url> <quality> --player <player> --player-args "<args>"
//! ```
//!
//! and spawns it as a detached process. The flag names are the extractor's
//! own wire contract and are not negotiable here.

use thiserror::Error;
use tracing::{debug, info};

use argmerge::{Context, MergeError};

use crate::model::{GlobalSettings, StreamEntry};

/// Which configured player profile a launch uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlayerProfile {
    #[default]
    Default,
    /// The alternate player from the global settings, when one is set.
    Alternate,
}

/// Record of a successful spawn.
///
/// Deliberately not a child handle: the player is detached and nothing here
/// manages its lifecycle. The PID and argv exist for display and logging.
#[derive(Debug, Clone)]
pub struct LaunchedStream {
    pub pid: u32,
    pub argv: Vec<String>,
}

/// Errors from building or spawning a launch command.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("stream entry has no url")]
    MissingUrl,

    /// Configuration authoring mistake in one of the argument strings.
    #[error("invalid arguments: {0}")]
    Merge(#[from] MergeError),

    /// The spawn syscall failed; the attempted argv is attached so the user
    /// can see exactly what was run.
    #[error("failed to launch {argv:?}: {source}")]
    Spawn {
        argv: Vec<String>,
        #[source]
        source: std::io::Error,
    },
}

/// Build the full argument vector for launching `entry`.
///
/// Argument layering: the global default string is the base, the entry's
/// string overrides it, and `$SC.name` / `$SC.type` are substituted from the
/// entry. Player arguments go through the same merge and are then passed as
/// one grouped value to `--player-args`.
pub fn build_command(
    entry: &StreamEntry,
    global: &GlobalSettings,
    profile: PlayerProfile,
) -> Result<Vec<String>, LaunchError> {
    let url = entry.url.trim();
    if url.is_empty() {
        return Err(LaunchError::MissingUrl);
    }

    let ctx: Context = [
        ("name".to_string(), entry.display_name().to_string()),
        ("type".to_string(), entry.kind_or_unknown().to_string()),
    ]
    .into_iter()
    .collect();

    let mut argv = vec![global.extractor_binary().to_string()];
    argv.extend(argmerge::merge(
        &global.default_extractor_args,
        &entry.extractor_args,
        &ctx,
    )?);
    argv.push(url.to_string());
    argv.push(quality_with_fallback(entry.effective_quality(global)));

    let (player, default_player_args) = match profile {
        PlayerProfile::Alternate if !global.alternate_player.is_empty() => (
            global.alternate_player.as_str(),
            global.alternate_player_args.as_str(),
        ),
        _ => {
            let player = if entry.player.is_empty() {
                global.default_player.as_str()
            } else {
                entry.player.as_str()
            };
            (player, global.default_player_args.as_str())
        }
    };

    if !player.is_empty() {
        argv.push("--player".to_string());
        argv.push(player.to_string());
    }
    let player_args = argmerge::merge(default_player_args, &entry.player_args, &ctx)?;
    if !player_args.is_empty() {
        argv.push("--player-args".to_string());
        argv.push(player_args.join(" "));
    }

    Ok(argv)
}

/// Launch `entry` as a detached process and return immediately.
///
/// The spawned extractor/player pair outlives this process; stdio goes to
/// the null sink. Nothing waits on the child.
pub fn launch(
    entry: &StreamEntry,
    global: &GlobalSettings,
    profile: PlayerProfile,
) -> Result<LaunchedStream, LaunchError> {
    let argv = build_command(entry, global, profile)?;
    debug!("launching: {}", argv.join(" "));

    let child = process_utils::spawn_detached(&argv).map_err(|source| LaunchError::Spawn {
        argv: argv.clone(),
        source,
    })?;

    info!("launched {} (pid {})", entry.display_name(), child.id());
    Ok(LaunchedStream {
        pid: child.id(),
        argv,
    })
}

/// A mistyped quality must not fail the whole command, so `best` is always
/// appended as a fallback (the extractor takes a comma-separated list).
fn quality_with_fallback(preference: &str) -> String {
    let preference = preference.trim();
    if preference.is_empty() || preference == "best" {
        "best".to_string()
    } else {
        format!("{preference},best")
    }
}

/// Render an argument vector for display, one argument per line with
/// platform line continuations, keeping flag/value pairs together.
pub fn format_command(argv: &[String]) -> String {
    let continuation = if cfg!(windows) { '^' } else { '\\' };
    let Some((program, rest)) = argv.split_first() else {
        return String::new();
    };

    let mut lines = vec![program.clone()];
    let mut iter = rest.iter().peekable();
    while let Some(token) = iter.next() {
        if token.starts_with('-') && iter.peek().is_some_and(|next| !next.starts_with('-')) {
            let value = iter.next().map(String::as_str).unwrap_or_default();
            lines.push(format!("  {token} {}", display_token(value)));
        } else {
            lines.push(format!("  {}", display_token(token)));
        }
    }
    lines.join(&format!(" {continuation}\n"))
}

fn display_token(token: &str) -> String {
    if token.chars().any(char::is_whitespace) {
        format!("\"{}\"", token.replace('"', "\\\""))
    } else {
        token.to_string()
    }
}
