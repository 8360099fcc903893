use std::path::PathBuf;

use clap::Parser;
use layerbar_config::{Config, Margin};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (default: `$XDG_CONFIG_HOME/layerbar/config.kdl`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Namespace of the layer surfaces.
    #[arg(short, long)]
    pub namespace: Option<String>,
    /// Only show the bar on the output with this announcement index.
    #[arg(short, long)]
    pub output: Option<usize>,
    /// Opacity of the bar, from 0 to 1.
    #[arg(short = 't', long)]
    pub opacity: Option<f64>,
    /// Layer surface margins as `top,right,bottom,left`.
    #[arg(short, long, value_parser = parse_margin)]
    pub margin: Option<Margin>,
    /// Slide the bar in and out continuously.
    #[arg(short, long)]
    pub animate: bool,
    /// Request exclusive keyboard focus.
    #[arg(short, long)]
    pub keyboard_interactive: bool,
}

impl Cli {
    /// Overrides config values with the flags that were given.
    pub fn apply(&self, config: &mut Config) {
        if let Some(namespace) = &self.namespace {
            config.namespace = namespace.clone();
        }
        if let Some(output) = self.output {
            config.output = Some(output);
        }
        if let Some(opacity) = self.opacity {
            config.opacity = opacity.clamp(0., 1.);
        }
        if let Some(margin) = self.margin {
            config.margin = margin;
        }
        config.animate |= self.animate;
        config.keyboard_interactive |= self.keyboard_interactive;
    }
}

fn parse_margin(value: &str) -> Result<Margin, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("invalid margin {value:?}: {err}"))?;

    let [top, right, bottom, left] = parts[..] else {
        return Err(format!(
            "margin needs four values as top,right,bottom,left, got {}",
            parts.len()
        ));
    };

    Ok(Margin {
        top,
        right,
        bottom,
        left,
    })
}
