//! Subcommand handlers for edit and config actions.

use std::path::{Path, PathBuf};

use super::args::{ConfigAction, EditArgs};
use super::enums::Background;
use crate::background::{BackgroundSpec, Color};
use crate::config::{default_path as get_config_path, Config, DEFAULT_CONFIG_TEMPLATE};
use crate::editor::Editor;
use crate::segmentation::{RemoveBgClient, Segmenter};
use crate::upload::{self, UploadOrigin};

/// Settings for one edit, after merging CLI args over the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct EditPlan {
    pub input: PathBuf,
    pub background: BackgroundSpec,
    pub zoom: u32,
    pub output_dir: PathBuf,
}

impl EditPlan {
    /// Merge settings: CLI args > config file > built-in defaults.
    pub fn resolve(args: &EditArgs, config: &Config) -> Result<Self, String> {
        let color = match &args.color {
            Some(text) => Color::from_hex(text).map_err(|e| e.to_string())?,
            None => config.custom_color().map_err(|e| e.to_string())?,
        };

        // --color on its own means a custom background
        let background = match (args.background, &args.color) {
            (Some(choice), _) => choice.resolve(color),
            (None, Some(_)) => Background::Custom.resolve(color),
            (None, None) => config.background().map_err(|e| e.to_string())?,
        };

        Ok(Self {
            input: args.input.clone(),
            background,
            zoom: args.zoom.unwrap_or_else(|| config.zoom()),
            output_dir: args
                .output_dir
                .clone()
                .unwrap_or_else(|| config.export_dir()),
        })
    }
}

/// Run one editing session end to end: upload, remove, compose, export.
///
/// Returns the path of the exported PNG.
pub async fn run_edit<S: Segmenter + ?Sized>(
    plan: &EditPlan,
    editor: &mut Editor,
    segmenter: &S,
) -> Result<PathBuf, String> {
    let file =
        upload::read_file(&plan.input, UploadOrigin::FilePicker).map_err(|e| e.to_string())?;
    editor.upload(file).map_err(|e| e.to_string())?;

    println!("Removing background...");
    editor
        .remove_background(segmenter)
        .await
        .map_err(|e| e.to_string())?;

    editor
        .select_background(plan.background)
        .map_err(|e| e.to_string())?;
    editor.set_zoom(plan.zoom).map_err(|e| e.to_string())?;

    editor
        .export(&plan.output_dir)
        .map_err(|e| e.to_string())
}

/// Handle `profile-photo edit`.
pub async fn handle_edit(args: &EditArgs, config: &Config) -> Result<(), String> {
    let plan = EditPlan::resolve(args, config)?;
    let client = RemoveBgClient::new(config.segmentation()).map_err(|e| e.to_string())?;
    let mut editor = Editor::new(config.compositor().map_err(|e| e.to_string())?);

    let path = run_edit(&plan, &mut editor, &client).await?;
    println!(
        "Saved {} (background: {}, zoom: {}%)",
        path.display(),
        plan.background,
        plan.zoom
    );
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(
    action: ConfigAction,
    config_path: Option<&Path>,
    config: &Config,
) -> Result<(), String> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    match action {
        ConfigAction::Show => {
            let segmentation = config.segmentation();
            println!("Current configuration:");
            println!("  Endpoint: {}", segmentation.endpoint);
            println!(
                "  API key: {} ({})",
                if segmentation.api_key().is_some() {
                    "set"
                } else {
                    "not set"
                },
                config.api_key_env()
            );
            println!("  Timeout: {}s", segmentation.timeout.as_secs());
            match config.compositor() {
                Ok(compositor) => {
                    println!("  Canvas: {0}x{0}", compositor.canvas_size());
                    println!(
                        "  Blur: radius {}px, bleed {}px",
                        compositor.blur_radius(),
                        compositor.blur_bleed()
                    );
                }
                Err(e) => println!("  Canvas: invalid ({})", e),
            }
            match config.background() {
                Ok(background) => println!("  Background: {}", background),
                Err(e) => println!("  Background: invalid ({})", e),
            }
            println!("  Zoom: {}%", config.zoom());
            println!("  Output directory: {}", config.export_dir().display());
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
            Ok(())
        }
        ConfigAction::Init => init_config(&config_path).map(|()| {
            println!("Created config file: {}", config_path.display());
        }),
    }
}

/// Write the default config file, refusing to overwrite an existing one.
pub fn init_config(config_path: &Path) -> Result<(), String> {
    if config_path.exists() {
        return Err(format!(
            "Config file already exists: {}\nUse 'profile-photo config show' to view current settings.",
            config_path.display()
        ));
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Error creating config directory: {}", e))?;
    }

    std::fs::write(config_path, DEFAULT_CONFIG_TEMPLATE)
        .map_err(|e| format!("Error writing config file: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::LIGHT_GRAY;

    fn args(input: &str) -> EditArgs {
        EditArgs {
            input: PathBuf::from(input),
            background: None,
            color: None,
            zoom: None,
            output_dir: None,
        }
    }

    #[test]
    fn test_plan_defaults() {
        let plan = EditPlan::resolve(&args("me.jpg"), &Config::default()).unwrap();
        assert_eq!(plan.background, BackgroundSpec::White);
        assert_eq!(plan.zoom, 100);
        assert_eq!(plan.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_plan_cli_overrides_config() {
        let config = Config::parse(
            "[defaults]\nbackground = \"blur\"\nzoom = 80\n[export]\ndirectory = \"cfg\"\n",
        )
        .unwrap();
        let mut a = args("me.jpg");
        a.background = Some(Background::LightGray);
        a.zoom = Some(140);
        a.output_dir = Some(PathBuf::from("cli"));

        let plan = EditPlan::resolve(&a, &config).unwrap();
        assert_eq!(plan.background.fill_color(), Some(LIGHT_GRAY));
        assert_eq!(plan.zoom, 140);
        assert_eq!(plan.output_dir, PathBuf::from("cli"));

        let plan = EditPlan::resolve(&args("me.jpg"), &config).unwrap();
        assert_eq!(plan.background, BackgroundSpec::Blurred);
        assert_eq!(plan.zoom, 80);
        assert_eq!(plan.output_dir, PathBuf::from("cfg"));
    }

    #[test]
    fn test_color_alone_selects_custom() {
        let mut a = args("me.jpg");
        a.color = Some("#0A66C2".to_string());
        let plan = EditPlan::resolve(&a, &Config::default()).unwrap();
        assert_eq!(plan.background, BackgroundSpec::Custom(Color::rgb(0x0A, 0x66, 0xC2)));
    }

    #[test]
    fn test_bad_color_rejected() {
        let mut a = args("me.jpg");
        a.color = Some("blue-ish".to_string());
        assert!(EditPlan::resolve(&a, &Config::default()).is_err());
    }

    #[test]
    fn test_init_config_writes_template_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        init_config(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG_TEMPLATE);

        let err = init_config(&path).unwrap_err();
        assert!(err.contains("already exists"));
    }
}
