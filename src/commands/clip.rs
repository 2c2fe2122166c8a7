use anyhow::Result;
use clap::Parser;
use dialoguer::Confirm;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::Config;
use crate::error::{ClipError, ClipResult};
use crate::ffmpeg::FFmpeg;
use crate::gfycat::{GfycatClient, Identity};
use crate::timespec;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct ClipArgs {
    /// The source video
    pub source: PathBuf,

    /// The start time of the clip, in [HH:]MM:SS[.fraction] format
    pub start: String,

    /// The end time of the clip, in [HH:]MM:SS[.fraction] format
    pub end: String,

    /// Save a local copy of the clip
    #[arg(short = 's', long = "savelocal", value_name = "PATH")]
    pub savelocal: Option<PathBuf>,

    /// Don't upload to gfycat
    #[arg(long)]
    pub nogfy: bool,

    /// Upload anonymously instead of with the stored account
    #[arg(short, long)]
    pub anon: bool,

    /// Path to the credentials file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run(args: ClipArgs) -> Result<()> {
    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
            .format_timestamp(None)
            .init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp(None)
            .init();
    }

    check_args(&args)?;

    FFmpeg::check_ffmpeg()?;
    let source_duration = FFmpeg::probe_duration(&args.source)?;
    let range = timespec::validate(&args.start, &args.end, source_duration)?;

    // When uploading, a missing or bad credentials file must fail the run
    // before the cut happens
    let config = if args.nogfy {
        None
    } else {
        let path = Config::resolve_path(args.config.clone());
        debug!("loading credentials from {}", path.display());
        let config = Config::from_file(&path)?;
        if !args.anon {
            config.user_identity()?;
        }
        if range.duration() > config.upload.max_clip_seconds {
            return Err(ClipError::ClipTooLong {
                seconds: range.duration(),
                limit: config.upload.max_clip_seconds,
            }
            .into());
        }
        Some(config)
    };

    if let Some(target) = &args.savelocal {
        if target.is_file() && !confirm_overwrite(target)? {
            return Err(ClipError::InvalidArgs("not overwriting - exiting".to_string()).into());
        }
    }

    // Scratch directory; removed on every exit path when it goes out of scope
    let scratch = TempDir::new()?;
    let scratch_output = scratch.path().join(scratch_file_name(args.savelocal.as_deref()));

    FFmpeg::cut_clip(
        &args.source,
        &scratch_output,
        range.start.total_seconds(),
        range.duration(),
    )?;

    if let Some(target) = &args.savelocal {
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::copy(&scratch_output, target)?;
        info!("Saved local copy to {}", target.display());
    }

    if let Some(config) = config {
        let client = GfycatClient::new(&config.upload);
        let identity = if args.anon {
            Identity::Anonymous
        } else {
            let (username, password) = config.user_identity()?;
            Identity::User { username, password }
        };

        let outcome = client.upload(&config.auth.gfycat, identity, &scratch_output)?;
        println!("Upload successful!");
        println!("Available at:\t{}", outcome.page_url);
        println!("Direct link at:\t{}", outcome.direct_url);
    }

    if let Some(target) = &args.savelocal {
        println!("Local copy at:\t{}", fs::canonicalize(target)?.display());
    }

    Ok(())
}

/// Reject bad flag combinations and a missing source before any work starts
fn check_args(args: &ClipArgs) -> ClipResult<()> {
    if args.nogfy && args.savelocal.is_none() {
        return Err(ClipError::InvalidArgs(
            "must set --savelocal to use the --nogfy option".to_string(),
        ));
    }
    if !args.source.is_file() {
        return Err(ClipError::InvalidArgs(format!(
            "source file \"{}\" does not exist",
            args.source.display()
        )));
    }
    Ok(())
}

/// Name the intermediate cut file after the local target when there is one
fn scratch_file_name(savelocal: Option<&Path>) -> String {
    savelocal
        .and_then(|p| p.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "clip.mp4".to_string())
}

fn confirm_overwrite(target: &Path) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(format!(
            "Output file \"{}\" already exists. Overwrite?",
            target.display()
        ))
        .default(false)
        .interact()?;
    Ok(confirmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args_for(source: PathBuf) -> ClipArgs {
        ClipArgs {
            source,
            start: "00:00".to_string(),
            end: "00:03".to_string(),
            savelocal: None,
            nogfy: false,
            anon: false,
            config: None,
            verbose: false,
        }
    }

    #[test]
    fn test_nogfy_requires_savelocal() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("video.mp4");
        std::fs::write(&source, b"fake").unwrap();

        let mut args = args_for(source);
        args.nogfy = true;
        assert!(matches!(
            check_args(&args),
            Err(ClipError::InvalidArgs(_))
        ));

        args.savelocal = Some(PathBuf::from("out.mp4"));
        assert!(check_args(&args).is_ok());
    }

    #[test]
    fn test_missing_source_is_rejected() {
        let args = args_for(PathBuf::from("/no/such/video.mp4"));
        assert!(matches!(
            check_args(&args),
            Err(ClipError::InvalidArgs(_))
        ));
    }

    #[test]
    fn test_scratch_file_named_after_local_target() {
        assert_eq!(
            scratch_file_name(Some(Path::new("clips/out.mp4"))),
            "out.mp4"
        );
        assert_eq!(scratch_file_name(None), "clip.mp4");
    }

    #[test]
    fn test_cli_parses_positional_and_flags() {
        let args = ClipArgs::try_parse_from([
            "clipthat",
            "video.mp4",
            "00:10",
            "00:15",
            "--savelocal",
            "out.mp4",
            "--nogfy",
            "-a",
        ])
        .unwrap();

        assert_eq!(args.source, PathBuf::from("video.mp4"));
        assert_eq!(args.start, "00:10");
        assert_eq!(args.end, "00:15");
        assert_eq!(args.savelocal, Some(PathBuf::from("out.mp4")));
        assert!(args.nogfy);
        assert!(args.anon);
    }
}
