//! Report configuration
use crate::stats::RunStats;
use crate::symbol::Theme;
use anyhow::Context as _;
use clap::{App, Arg, ArgMatches};
use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::Arc;

/// Renders extra lines after the cross-worker summary
pub type Epilogue = Arc<dyn Fn(&dyn RunStats) -> Vec<String> + Send + Sync>;

/// When to color output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChoice {
    /// Color if stdout looks like it supports it
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

impl ColorChoice {
    /// Resolve to a yes or no
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                anstream::AutoStream::choice(&io::stdout()) != anstream::ColorChoice::Never
            }
        }
    }
}

impl FromStr for ColorChoice {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "auto" => Self::Auto,
            "always" => Self::Always,
            "never" => Self::Never,
            _ => anyhow::bail!("invalid color choice {:?}", s),
        })
    }
}

/// Report options, shared by all reporters of a run
pub struct ReportOptions {
    /// Command line arguments, if the options were built from a command line
    pub opts: ArgMatches<'static>,
    /// Stream output as events arrive instead of once per worker. Only sound when at most one
    /// worker runs at a time; this is assumed, not checked.
    pub realtime: bool,
    /// How glyphs and colors look
    pub theme: Theme,
    /// Lines printed after the cross-worker summary
    pub epilogue: Option<Epilogue>,
}

impl fmt::Debug for ReportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportOptions")
            .field("realtime", &self.realtime)
            .field("theme", &self.theme)
            .field("epilogue", &self.epilogue.is_some())
            .finish()
    }
}

impl ReportOptions {
    /// Creates a [`ReportOptionsBuilder`]
    pub fn builder() -> ReportOptionsBuilder {
        ReportOptionsBuilder::new()
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`ReportOptions`]
pub struct ReportOptionsBuilder {
    max_instances: usize,
    color: ColorChoice,
    ok_glyph: Option<String>,
    epilogue: Option<Epilogue>,
}

impl Default for ReportOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportOptionsBuilder {
    /// Create a new [`ReportOptionsBuilder`]. Defaults to batched, uncolored output.
    pub fn new() -> Self {
        Self {
            max_instances: 0,
            color: ColorChoice::Never,
            ok_glyph: None,
            epilogue: None,
        }
    }

    /// How many workers the engine runs at once. Exactly one selects real-time output.
    pub fn max_instances(&mut self, n: usize) -> &mut Self {
        self.max_instances = n;
        self
    }

    /// When to color output
    pub fn color(&mut self, color: ColorChoice) -> &mut Self {
        self.color = color;
        self
    }

    /// Glyph shown for passing tests
    pub fn ok_glyph<T: Into<String>>(&mut self, glyph: T) -> &mut Self {
        self.ok_glyph = Some(glyph.into());
        self
    }

    /// Lines to print after the cross-worker summary
    pub fn epilogue<F>(&mut self, epilogue: F) -> &mut Self
    where
        F: Fn(&dyn RunStats) -> Vec<String> + Send + Sync + 'static,
    {
        self.epilogue = Some(Arc::new(epilogue));
        self
    }

    fn finish(&self, opts: ArgMatches<'static>) -> ReportOptions {
        let mut theme = if self.color.enabled() {
            Theme::colored()
        } else {
            Theme::plain()
        };
        if let Some(glyph) = &self.ok_glyph {
            theme.ok_glyph = glyph.clone();
        }

        ReportOptions {
            opts,
            realtime: self.max_instances == 1,
            theme,
            epilogue: self.epilogue.clone(),
        }
    }

    /// Create the options without looking at the command line
    pub fn build(&self) -> ReportOptions {
        self.finish(ArgMatches::default())
    }

    /// Add the report options to a command line
    pub fn add_options<'a>(app: App<'static, 'a>) -> App<'static, 'a> {
        app.arg(
            Arg::with_name("max-instances")
                .long("max-instances")
                .takes_value(true)
                .value_name("N")
                .help("Workers the engine ran at once. 1 streams output as events arrive."),
        )
        .arg(
            Arg::with_name("color")
                .long("color")
                .takes_value(true)
                .value_name("WHEN")
                .possible_values(&["auto", "always", "never"])
                .help("Color output. Default is auto."),
        )
    }

    /// Create the options from a command line. Values given on the command line override the
    /// builder's. `max-instances` falls back to 1 and `color` to auto.
    pub fn build_with_app_from<I, T>(
        &mut self,
        app: App<'static, '_>,
        iter: I,
    ) -> anyhow::Result<ReportOptions>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let opts = Self::add_options(app).get_matches_from_safe(iter)?;

        self.max_instances = match opts.value_of("max-instances") {
            Some(n) => n
                .parse()
                .with_context(|| format!("Bad --max-instances value {:?}", n))?,
            None => 1,
        };
        self.color = match opts.value_of("color") {
            Some(color) => color.parse()?,
            None => ColorChoice::Auto,
        };

        Ok(self.finish(opts))
    }
}
