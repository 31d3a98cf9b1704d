//! shade - print the computed style of an element in an HTML file

use std::process::ExitCode;

use clap::Parser;

use shade::css::{ColorScheme, MediaType};
use shade::dom::{ArenaDom, ArenaNodeId, ElementRef, parse_html};
use shade::{PropertyManager, Result, resolve_style};

#[derive(Parser)]
#[command(name = "shade")]
#[command(version, about = "Computed CSS styles for HTML with shadow DOM", long_about = None)]
#[command(after_help = "EXAMPLES:
    shade page.html '#title'              Computed style of #title
    shade page.html p --specified         Inline style of the first <p>
    shade page.html .card --width 480     Evaluate media queries at 480px
    RUST_LOG=trace shade page.html span   Trace shadow boundary crossings")]
struct Cli {
    /// HTML file to read
    #[arg(value_name = "INPUT")]
    input: String,

    /// Selector of the element to inspect (first match, shadow trees included)
    #[arg(value_name = "SELECTOR")]
    selector: String,

    /// Print the inline style instead of the computed style
    #[arg(long)]
    specified: bool,

    /// Print JSON instead of declarations
    #[arg(long)]
    json: bool,

    /// Viewport width in CSS pixels
    #[arg(long, default_value_t = 1024.0)]
    width: f32,

    /// Viewport height in CSS pixels
    #[arg(long, default_value_t = 768.0)]
    height: f32,

    /// Device pixel ratio
    #[arg(long, default_value_t = 1.0)]
    dpr: f32,

    /// Evaluate media queries for print
    #[arg(long)]
    print: bool,

    /// Prefer the dark color scheme
    #[arg(long)]
    dark: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("error: no element matches `{}`", cli.selector);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `false` when no element matches the selector.
fn run(cli: &Cli) -> Result<bool> {
    let html = std::fs::read_to_string(&cli.input)?;
    let mut dom = parse_html(&html);
    configure_viewport(&mut dom, cli);

    let Some(element) = find_element(&dom, &cli.selector)? else {
        return Ok(false);
    };
    let style = resolve_style(&dom, element, !cli.specified)?;
    print_style(&style, cli.json);
    Ok(true)
}

fn configure_viewport(dom: &mut ArenaDom, cli: &Cli) {
    let viewport = dom.viewport_mut();
    viewport.width = cli.width;
    viewport.height = cli.height;
    viewport.device_pixel_ratio = cli.dpr;
    if cli.print {
        viewport.media_type = MediaType::Print;
    }
    if cli.dark {
        viewport.color_scheme = ColorScheme::Dark;
    }
}

fn find_element(dom: &ArenaDom, selector: &str) -> Result<Option<ArenaNodeId>> {
    let candidates = dom.shadow_including_descendants(dom.document());
    for id in candidates.into_iter().filter(|&id| dom.is_element(id)) {
        if ElementRef::new(dom, id).matches(selector)? {
            return Ok(Some(id));
        }
    }
    Ok(None)
}

fn print_style(style: &PropertyManager, json: bool) {
    if json {
        match serde_json::to_string_pretty(style) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("error: {e}"),
        }
        return;
    }
    for (name, value) in style.iter() {
        if value.important {
            println!("{name}: {} !important;", value.value);
        } else {
            println!("{name}: {};", value.value);
        }
    }
}
