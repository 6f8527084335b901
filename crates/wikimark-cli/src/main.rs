// Command-line interface for wikimark
//
// Renders and inspects pages of a wiki directory without the web server.
//
// Usage:
//  wikimark [--wiki <dir>] [--config <file>] render <page> [--json] [--highlight <term>]
//  wikimark [--wiki <dir>] links <page>
//  wikimark [--wiki <dir>] toc <page>
//  wikimark [--wiki <dir>] backlinks <page>
//  wikimark [--wiki <dir>] pages
//
// The wiki directory comes from --wiki, or from wiki_path in the config file
// (~/.config/wikimark/config.toml unless --config says otherwise).

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wikimark_config::{Config, RenderConfig};
use wikimark_engine::{
    DirectoryImages, HashLinkEncoder, MarkupRenderer, Page, RenderOptions, io,
};

#[derive(Debug, Parser)]
#[command(name = "wikimark", version, about = "Render and inspect wikimark pages")]
struct Cli {
    /// Wiki directory; overrides wiki_path from the config file
    #[arg(long, global = true, value_name = "DIR")]
    wiki: Option<PathBuf>,

    /// Config file to read instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render a page to HTML
    Render {
        page: String,
        /// Print the HTML with links, headings, categories, tags and footnotes as JSON
        #[arg(long)]
        json: bool,
        /// Highlight a search term in the rendered HTML
        #[arg(long, value_name = "TERM")]
        highlight: Option<String>,
    },
    /// List pages a page links to
    Links { page: String },
    /// Print a page's table of contents
    Toc { page: String },
    /// List pages linking to a page
    Backlinks { page: String },
    /// List all pages
    Pages,
}

/// Everything needed to render pages of one wiki.
struct Wiki {
    root: PathBuf,
    images: DirectoryImages,
    links: HashLinkEncoder,
    options: RenderOptions,
}

impl Wiki {
    fn from_config(config: &Config) -> Self {
        Self {
            root: config.wiki_path.clone(),
            images: DirectoryImages::new(config.images_dir()),
            links: HashLinkEncoder::new(config.render.link_prefix.clone()),
            options: render_options(&config.render),
        }
    }

    fn renderer(&self) -> MarkupRenderer<'_> {
        MarkupRenderer::with_options(&self.images, &self.links, self.options.clone())
    }

    fn read(&self, title: &str) -> Result<String> {
        let page = Page::from_title(title)?;
        io::read_page(&page, &self.root).with_context(|| format!("Cannot open page '{title}'"))
    }
}

fn render_options(render: &RenderConfig) -> RenderOptions {
    RenderOptions {
        empty_placeholder: render.empty_placeholder.clone(),
        toc_marker: render.toc_marker.clone(),
        toc_title: render.toc_title.clone(),
        category_prefix: render.category_prefix.clone(),
        allow_raw_html: render.allow_raw_html,
    }
}

/// Resolves the effective configuration: the config file if present, with
/// `--wiki` taking precedence for the wiki directory.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let loaded = Config::load_from_path(&config_path)
        .with_context(|| format!("Failed to load config file {}", config_path.display()))?;

    let config = match (loaded, &cli.wiki) {
        (Some(mut config), Some(wiki)) => {
            if config.images_path.is_none() {
                config.images_path = Some(wiki.join("images"));
            }
            config.wiki_path = wiki.clone();
            config
        }
        (Some(config), None) => config,
        (None, Some(wiki)) => Config::new(wiki.clone()),
        (None, None) => bail!(
            "No wiki directory given and no config file found; pass --wiki <dir> or create {}",
            config_path.display()
        ),
    };

    io::validate_wiki_dir(&config.wiki_path).with_context(|| {
        format!("Wiki path '{}' is invalid", config.wiki_path.display())
    })?;
    Ok(config)
}

fn run(cli: &Cli) -> Result<String> {
    let config = resolve_config(cli)?;
    let wiki = Wiki::from_config(&config);
    let renderer = wiki.renderer();
    log::debug!("Using wiki at {}", wiki.root.display());

    let output = match &cli.command {
        Commands::Render {
            page,
            json,
            highlight,
        } => {
            let content = wiki.read(page)?;
            let mut result = renderer.render_document(content.as_str());
            if let Some(term) = highlight {
                result.html = renderer.highlight_search_term(&result.html, term);
            }
            if *json {
                serde_json::to_string_pretty(&result)?
            } else {
                result.html
            }
        }
        Commands::Links { page } => {
            let content = wiki.read(page)?;
            lines(renderer.get_linked_pages(content.as_str()))
        }
        Commands::Toc { page } => {
            let content = wiki.read(page)?;
            lines(
                renderer
                    .generate_table_of_contents(content.as_str())
                    .into_iter()
                    .map(|entry| {
                        format!(
                            "{}{} (#{})",
                            "  ".repeat(usize::from(entry.level.saturating_sub(1))),
                            entry.text,
                            entry.anchor_id
                        )
                    }),
            )
        }
        Commands::Backlinks { page } => {
            let index = io::build_backlink_index(&wiki.root, &renderer)?;
            lines(index.backlinks(page))
        }
        Commands::Pages => {
            let pages = io::scan_pages(&wiki.root)?;
            lines(pages.iter().map(Page::title))
        }
    };
    Ok(output)
}

fn lines<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn wiki_with(pages: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (title, content) in pages {
            fs::write(dir.path().join(format!("{title}.wiki")), content).unwrap();
        }
        dir
    }

    fn cli(dir: &TempDir, args: &[&str]) -> Cli {
        let missing_config = dir.path().join("no-config.toml");
        let mut argv = vec![
            "wikimark".to_string(),
            "--wiki".to_string(),
            dir.path().display().to_string(),
            "--config".to_string(),
            missing_config.display().to_string(),
        ];
        argv.extend(args.iter().map(|a| a.to_string()));
        Cli::parse_from(argv)
    }

    #[test]
    fn render_prints_html() {
        let dir = wiki_with(&[("Home", "Hello **world**")]);
        let output = run(&cli(&dir, &["render", "Home"])).unwrap();
        assert_eq!(output, "<p>Hello <strong>world</strong></p>");
    }

    #[test]
    fn render_json_includes_metadata() {
        let dir = wiki_with(&[("Home", "= Top =\n[[Rust]] #tag")]);
        let output = run(&cli(&dir, &["render", "Home", "--json"])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["outgoing_links"], serde_json::json!(["Rust"]));
        assert_eq!(value["tags"], serde_json::json!(["tag"]));
        assert_eq!(value["table_of_contents"][0]["anchor_id"], "top");
    }

    #[test]
    fn render_with_highlight() {
        let dir = wiki_with(&[("Home", "find me")]);
        let output = run(&cli(&dir, &["render", "Home", "--highlight", "me"])).unwrap();
        assert_eq!(
            output,
            "<p>find <mark class=\"search-highlight\">me</mark></p>"
        );
    }

    #[test]
    fn toc_indents_by_level() {
        let dir = wiki_with(&[("Home", "= One =\n== Two ==")]);
        let output = run(&cli(&dir, &["toc", "Home"])).unwrap();
        assert_eq!(output, "One (#one)\n  Two (#two)");
    }

    #[test]
    fn links_and_backlinks() {
        let dir = wiki_with(&[("Home", "[[B]] [x](A)"), ("A", "[[Home]]"), ("B", "")]);
        assert_eq!(run(&cli(&dir, &["links", "Home"])).unwrap(), "A\nB");
        assert_eq!(run(&cli(&dir, &["backlinks", "Home"])).unwrap(), "A");
        assert_eq!(run(&cli(&dir, &["pages"])).unwrap(), "A\nB\nHome");
    }

    #[test]
    fn missing_page_is_an_error() {
        let dir = wiki_with(&[]);
        let err = run(&cli(&dir, &["render", "Nope"])).unwrap_err();
        assert!(format!("{err:#}").contains("Cannot open page 'Nope'"));
    }

    #[test]
    fn titles_escaping_the_wiki_are_refused() {
        let dir = wiki_with(&[("Home", "text")]);
        fs::write(dir.path().join("outside.wiki"), "secret").unwrap();
        let nested = dir.path().join("wiki");
        fs::create_dir(&nested).unwrap();

        let cli = Cli::parse_from([
            "wikimark",
            "--wiki",
            nested.to_str().unwrap(),
            "--config",
            dir.path().join("no-config.toml").to_str().unwrap(),
            "render",
            "../outside",
        ]);
        let err = run(&cli).unwrap_err();
        assert!(err.to_string().contains("Invalid page title"));
    }

    #[test]
    fn config_file_supplies_wiki_and_render_settings() {
        let dir = wiki_with(&[("Home", "")]);
        let config_path = dir.path().join("config.toml");
        let mut config = Config::new(dir.path().to_path_buf());
        config.render.empty_placeholder = "Nothing here".to_string();
        config.save_to_path(&config_path).unwrap();

        let cli = Cli::parse_from([
            "wikimark",
            "--config",
            config_path.to_str().unwrap(),
            "render",
            "Home",
        ]);
        assert_eq!(
            run(&cli).unwrap(),
            "<p class=\"empty-page\">Nothing here</p>"
        );
    }

    #[test]
    fn no_wiki_and_no_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let cli = Cli::parse_from(["wikimark", "--config", missing.to_str().unwrap(), "pages"]);
        let err = run(&cli).unwrap_err();
        assert!(err.to_string().contains("No wiki directory given"));
    }
}
