use std::ffi::OsString;
use std::path::PathBuf;

use clap::Args;
use clap::Parser;

/// Options shared by every demo.
#[derive(Debug, Clone, Args)]
pub struct SampleCommandLine {
    /// Render on the WARP software adapter.
    #[arg(long)]
    pub warp: bool,

    /// Client area width.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Client area height.
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Present immediately instead of waiting for vblank.
    #[arg(long)]
    pub no_vsync: bool,

    /// Directory holding `shader/`, `texture/` and `model/`.
    #[arg(long)]
    pub asset_dir: Option<PathBuf>,
}

impl SampleCommandLine {
    pub fn sync_interval(&self) -> u32 {
        if self.no_vsync { 0 } else { 1 }
    }
}

/// No demo-specific options.
#[derive(Debug, Clone, Default, Args)]
pub struct NoArgs {}

#[derive(Debug, Parser)]
pub struct DemoCli<T: Args> {
    #[command(flatten)]
    pub common: SampleCommandLine,

    #[command(flatten)]
    pub demo: T,
}

/// Maps the single dash and slash spellings `-warp` and `/warp` onto `--warp`.
pub fn normalize_args<I, S>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| match arg.to_str() {
            Some(s) if s.eq_ignore_ascii_case("-warp") || s.eq_ignore_ascii_case("/warp") => {
                OsString::from("--warp")
            }
            _ => arg,
        })
        .collect()
}

pub fn parse_command_line<T: Args>() -> DemoCli<T> {
    DemoCli::parse_from(normalize_args(std::env::args_os()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Args)]
    struct ModelArgs {
        #[arg(long)]
        model: Option<PathBuf>,
    }

    #[test]
    fn defaults() {
        let cli = DemoCli::<NoArgs>::parse_from(["demo"]);
        assert!(!cli.common.warp);
        assert_eq!((cli.common.width, cli.common.height), (1280, 720));
        assert_eq!(cli.common.sync_interval(), 1);
        assert!(cli.common.asset_dir.is_none());
    }

    #[test]
    fn legacy_warp_switches() {
        for flag in ["-warp", "/warp", "/WARP", "--warp"] {
            let cli = DemoCli::<NoArgs>::parse_from(normalize_args(["demo", flag]));
            assert!(cli.common.warp, "{flag} should enable warp");
        }
    }

    #[test]
    fn other_args_are_untouched() {
        let args = normalize_args(["demo", "--width", "800", "-w"]);
        assert_eq!(args, vec!["demo", "--width", "800", "-w"]);
    }

    #[test]
    fn demo_args_are_flattened() {
        let cli = DemoCli::<ModelArgs>::parse_from([
            "demo",
            "--model",
            "res/model/duck.gltf",
            "--no-vsync",
            "--height",
            "600",
        ]);
        assert_eq!(cli.demo.model, Some(PathBuf::from("res/model/duck.gltf")));
        assert_eq!(cli.common.sync_interval(), 0);
        assert_eq!(cli.common.height, 600);
    }
}
