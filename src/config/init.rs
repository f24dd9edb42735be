use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, validate_config, ColumnConfig, Config};
use crate::corpus::YearRange;
use crate::output::{write_atomic, OutputFormat};
use crate::schema::{parse_schemas, Schema};

/// Starter configuration written by `init --defaults`.
pub fn default_template() -> Config {
    Config {
        schemas: Some(Schema::ALL.iter().map(|s| s.name().to_string()).collect()),
        output: Some(OutputFormat::Table.to_string()),
        columns: ColumnConfig::default(),
        ..Default::default()
    }
}

/// Line-oriented prompts over any input/output pair.
struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Prompt with a message and return the trimmed input.
    fn prompt(&mut self, message: &str) -> Result<String> {
        Ok(self.prompt_raw(message)?.trim().to_string())
    }

    /// Input without the line ending; surrounding whitespace is kept.
    fn prompt_raw(&mut self, message: &str) -> Result<String> {
        write!(self.output, "{}", message).context("Failed to write prompt")?;
        self.output.flush().context("Failed to flush stdout")?;
        let mut line = String::new();
        self.input.read_line(&mut line).context("Failed to read input")?;
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }

    /// A delimiter may itself be whitespace, so the answer is not trimmed.
    /// `\t` stands for a tab.
    fn prompt_delimiter(&mut self, message: &str, default: &str) -> Result<String> {
        let input = self.prompt_raw(&format!("{} [{}]: ", message, default))?;
        Ok(match input.as_str() {
            "" => default.to_string(),
            "\\t" => "\t".to_string(),
            _ => input,
        })
    }

    /// Returns `default` if the input is empty.
    fn prompt_with_default(&mut self, message: &str, default: &str) -> Result<String> {
        let input = self.prompt(&format!("{} [{}]: ", message, default))?;
        if input.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(input)
        }
    }

    fn prompt_yes_no(&mut self, message: &str, default_yes: bool) -> Result<bool> {
        let hint = if default_yes { "Y/n" } else { "y/N" };
        let input = self.prompt(&format!("{} [{}]: ", message, hint))?.to_lowercase();
        if input.is_empty() {
            Ok(default_yes)
        } else {
            Ok(input == "y" || input == "yes")
        }
    }

    fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{}", line).context("Failed to write output")
    }

    /// Re-prompt until `accept` returns `Ok`.
    fn prompt_until<T>(
        &mut self,
        message: &str,
        default: &str,
        accept: impl Fn(&str) -> Result<T, String>,
    ) -> Result<T> {
        loop {
            let input = self.prompt_with_default(message, default)?;
            match accept(&input) {
                Ok(value) => return Ok(value),
                Err(e) => self.say(&format!("  Invalid: {}. Try again.", e))?,
            }
        }
    }
}

fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ask the analysis questions and build a config from the answers.
fn ask_config<R: BufRead, W: Write>(p: &mut Prompter<R, W>) -> Result<Config> {
    p.say("Credit schemas: comma-separated names, or 'all'.")?;
    let schemas = p.prompt_until("Schemas", "all", |input| {
        if input.eq_ignore_ascii_case("all") {
            return Ok(None);
        }
        let names = split_list(input);
        parse_schemas(&names)
            .map(|_| Some(names))
            .map_err(|unknown| {
                unknown
                    .iter()
                    .map(|u| u.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
    })?;

    p.say("")?;
    p.say("Document types to keep, e.g. 'Article, Review'. 'all' keeps every type.")?;
    let document_types = p.prompt_until("Document types", "all", |input| {
        if input.eq_ignore_ascii_case("all") {
            return Ok(None);
        }
        let types = split_list(input);
        if types.is_empty() {
            Err("name at least one type".to_string())
        } else {
            Ok(Some(types))
        }
    })?;

    p.say("")?;
    p.say("Publication years: '<N', '<=N', '>N', '>=N', 'N-M' or 'N'. 'all' keeps every year.")?;
    let years = p.prompt_until("Years", "all", |input| {
        if input.eq_ignore_ascii_case("all") {
            return Ok(None);
        }
        YearRange::parse(input)
            .map(|_| Some(input.to_string()))
            .map_err(|e| e.to_string())
    })?;

    p.say("")?;
    let output = p.prompt_until("Default output format (table, tsv, csv, json)", "table", |input| {
        input
            .parse::<OutputFormat>()
            .map(|format| Some(format.to_string()))
    })?;

    let threads = p.prompt_until("Worker threads ('auto' for one per core)", "auto", |input| {
        if input.eq_ignore_ascii_case("auto") {
            return Ok(None);
        }
        match input.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err("must be a positive whole number".to_string()),
        }
    })?;

    p.say("")?;
    let use_scopus_columns = p.prompt_yes_no("Corpus files use Scopus column names?", true)?;
    let columns = if use_scopus_columns {
        ColumnConfig::default()
    } else {
        let defaults = ColumnConfig::default();
        ColumnConfig {
            author_ids: p.prompt_with_default("Author ID column", &defaults.author_ids)?,
            author_id_delimiter: p.prompt_delimiter("Author ID delimiter", &defaults.author_id_delimiter)?,
            document_type: p.prompt_with_default("Document type column", &defaults.document_type)?,
            year: p.prompt_with_default("Year column", &defaults.year)?,
            ..defaults
        }
    };

    Ok(Config {
        schemas,
        document_types,
        years,
        threads,
        output,
        columns,
    })
}

/// Serialize and atomically write a config file, creating parent directories.
pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    write_atomic(path, yaml.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))
}

/// Write the starter config without prompting. Refuses to overwrite.
pub fn write_default_config(path: Option<PathBuf>) -> Result<PathBuf> {
    let path = match path {
        Some(path) => path,
        None => get_config_path()?,
    };
    if path.exists() {
        anyhow::bail!("Config already exists at {}", path.display());
    }
    write_config(&path, &default_template())?;
    Ok(path)
}

/// Run the interactive init wizard on stdin/stdout.
///
/// If `default_path` is Some, it is offered as the config file path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    let stdin = std::io::stdin();
    let mut prompter = Prompter {
        input: stdin.lock(),
        output: std::io::stdout(),
    };
    run_wizard(&mut prompter, default_path).map(|_| ())
}

/// Returns the written path, or `None` if the user declined to overwrite.
fn run_wizard<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    default_path: Option<PathBuf>,
) -> Result<Option<PathBuf>> {
    p.say("")?;
    p.say("Author Credit Configuration Wizard")?;
    p.say("==================================")?;
    p.say("")?;

    let config = ask_config(p)?;
    // Every answer was checked as it was given.
    if let Err(errors) = validate_config(&config) {
        anyhow::bail!("Wizard produced an invalid config: {}", errors.join("; "));
    }

    let default_path = match default_path {
        Some(path) => path,
        None => get_config_path()?,
    };
    p.say("")?;
    let path_str = p.prompt_with_default("Where should the config be saved?", &default_path.display().to_string())?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = p.prompt_yes_no(
            &format!("Config already exists at {}. Overwrite?", config_path.display()),
            false,
        )?;
        if !overwrite {
            p.say("Aborted.")?;
            return Ok(None);
        }
    }

    write_config(&config_path, &config)?;

    p.say("")?;
    p.say(&format!("Config written to {}", config_path.display()))?;
    p.say("Run `author-credit metrics <CORPUS>... --researchers <FILE>` to get started.")?;
    Ok(Some(config_path))
}
