use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use snapdeck_layout::{
    Axis, Child, ContainerConfig, Layer, NavigationAnchor, Placement, SectionBounds,
    SectionContainer, SnapMode, Zone,
};
use snapdeck_state::{
    AppContext, DirectorySource, FileStorage, Language, LoadOutcome, ThemeOverrides, ToastKind,
    UiAction,
};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SNAPDECK_LOG";

#[derive(Parser)]
#[command(
    name = "snapdeck-cli",
    about = "Inspect and drive snapdeck presentation state",
    author,
    version
)]
struct Cli {
    /// 指定工作區根目錄；預設為目前目錄。 / Workspace root (defaults to current directory).
    #[arg(long, global = true, value_name = "PATH")]
    workspace: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 主題與字型。 / Themes and typefaces.
    #[command(subcommand)]
    Theme(ThemeCommand),
    /// 語言與翻譯。 / Languages and translations.
    #[command(subcommand)]
    Lang(LangCommand),
    /// 套用介面動作並輸出結果。 / Apply UI actions to a fresh state and print the result.
    Ui(UiArgs),
    /// 區段容器。 / Section container tools.
    #[command(subcommand)]
    Sections(SectionsCommand),
    /// 區域覆蓋層工具。 / Zone overlay tools.
    #[command(subcommand)]
    Zone(ZoneCommand),
}

#[derive(Subcommand)]
enum ThemeCommand {
    /// 列出主題與字型目錄。 / List registered themes and the font catalog.
    List,
    /// 切換主題。 / Switch to a registered theme.
    Select {
        /// 主題名稱。 / Registered theme name.
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// 變更字型。 / Change the typeface.
    Font(FontArgs),
    /// 由 JSON 檔合併主題欄位。 / Merge partial theme fields from a JSON file.
    Merge {
        /// 覆寫檔案。 / JSON file holding the fields to merge.
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
    /// 輸出目前主題的 CSS 變數。 / Print the CSS custom properties of the current theme.
    Vars,
}

#[derive(Args)]
struct FontArgs {
    /// 切換至下一個字型。 / Advance to the next catalog font.
    #[arg(long, conflicts_with = "set")]
    cycle: bool,
    /// 依類別名稱選擇字型。 / Select a font by class name.
    #[arg(long, value_name = "CLASS")]
    set: Option<String>,
}

#[derive(Subcommand)]
enum LangCommand {
    /// 列出支援的語系。 / List supported languages.
    List,
    /// 保存目前語系。 / Persist the current language.
    Set {
        /// 語系代碼。 / Language code, e.g. `en` or `ja`.
        #[arg(value_name = "CODE")]
        code: String,
    },
    /// 以目前語系翻譯路徑。 / Resolve a dotted translation path in the current language.
    Translate {
        /// 以點分隔的鍵。 / Dotted translation path.
        #[arg(value_name = "PATH")]
        path: String,
        /// 找不到時的預設文字。 / Text returned when the path does not resolve.
        #[arg(long, value_name = "TEXT")]
        fallback: Option<String>,
        /// 先行合併的翻譯目錄。 / Directory with `<code>.json` translation trees to merge first.
        #[arg(long, value_name = "DIR")]
        from: Option<PathBuf>,
    },
    /// 載入翻譯並回報缺漏鍵。 / Load a translation tree and report keys still missing against English.
    Load {
        /// 語系代碼。 / Language to load.
        #[arg(value_name = "CODE")]
        code: String,
        /// 翻譯目錄。 / Directory with `<code>.json` translation trees.
        #[arg(long, value_name = "DIR")]
        from: PathBuf,
    },
    /// 列出缺漏的翻譯鍵。 / List keys present in English but missing from a language.
    Missing {
        /// 語系代碼。 / Language to compare against English.
        #[arg(value_name = "CODE")]
        code: String,
    },
}

#[derive(Args)]
struct UiArgs {
    /// 依序套用的動作。 / Actions in order, e.g. `toggle-menu`, `open-modal=Hello`, `toast=Saved:success`.
    #[arg(required = true, value_name = "ACTION")]
    actions: Vec<String>,
}

#[derive(Subcommand)]
enum SectionsCommand {
    /// 模擬等距區段的作用中區段。 / Compute the active section for evenly spaced sections at a scroll offset.
    Simulate(SimulateArgs),
}

#[derive(Args)]
struct SimulateArgs {
    /// 區段數量。 / Number of sections.
    #[arg(long, value_name = "N")]
    count: usize,
    /// 每個區段的長度。 / Length of each section along the scroll axis.
    #[arg(long, value_name = "L")]
    length: f64,
    /// 視窗長度。 / Viewport length along the scroll axis.
    #[arg(long, value_name = "V")]
    viewport: f64,
    /// 依序輸入的捲動位置。 / Scroll offsets to feed, in order.
    #[arg(long = "offset", value_name = "O", required = true)]
    offsets: Vec<f64>,
    /// 區段間距。 / Gap between sections.
    #[arg(long, default_value_t = 0.0)]
    gap: f64,
    /// 捲動軸向。 / Scroll axis.
    #[arg(long, value_enum, default_value_t = AxisChoice::Vertical)]
    axis: AxisChoice,
    /// 吸附模式。 / Scroll snapping strength.
    #[arg(long, value_enum, default_value_t = SnapChoice::Mandatory)]
    snap: SnapChoice,
    /// 輸出導覽指示器。 / Print the navigation indicators.
    #[arg(long)]
    navigation: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AxisChoice {
    #[value(alias = "y")]
    Vertical,
    #[value(alias = "x")]
    Horizontal,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SnapChoice {
    Off,
    Mandatory,
    Proximity,
}

impl From<AxisChoice> for Axis {
    fn from(choice: AxisChoice) -> Self {
        match choice {
            AxisChoice::Vertical => Axis::Vertical,
            AxisChoice::Horizontal => Axis::Horizontal,
        }
    }
}

impl From<SnapChoice> for SnapMode {
    fn from(choice: SnapChoice) -> Self {
        match choice {
            SnapChoice::Off => SnapMode::Off,
            SnapChoice::Mandatory => SnapMode::Mandatory,
            SnapChoice::Proximity => SnapMode::Proximity,
        }
    }
}

#[derive(Subcommand)]
enum ZoneCommand {
    /// 輸出區域與圖層的定位規則。 / Print the positioning rule for a zone and layer.
    Place {
        /// 區域名稱。 / Zone name, e.g. `top-left` or `center`.
        #[arg(value_name = "ZONE")]
        zone: String,
        /// 圖層名稱。 / Layer name.
        #[arg(value_name = "LAYER", default_value = "content")]
        layer: String,
    },
    /// 列出所有區域與圖層。 / List all zones and layers.
    List,
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> Result<()> {
    let Cli { workspace, command } = Cli::parse();
    match command {
        Commands::Theme(subcommand) => {
            let workspace_root = resolve_workspace(workspace)?;
            execute_theme_command(subcommand, &workspace_root)
        }
        Commands::Lang(subcommand) => {
            let workspace_root = resolve_workspace(workspace)?;
            execute_lang_command(subcommand, &workspace_root)
        }
        Commands::Ui(args) => execute_ui(args),
        Commands::Sections(SectionsCommand::Simulate(args)) => simulate_sections(args),
        Commands::Zone(subcommand) => execute_zone_command(subcommand),
    }
}

fn open_context(workspace_root: &Path) -> Result<AppContext> {
    let root = storage_dir(workspace_root);
    fs::create_dir_all(&root)
        .with_context(|| format!("create storage directory {}", root.display()))?;
    tracing::debug!(storage = %root.display(), "opening workspace state");
    let mut app = AppContext::new(Arc::new(FileStorage::new(root)));
    app.hydrate();
    Ok(app)
}

fn execute_theme_command(command: ThemeCommand, workspace_root: &Path) -> Result<()> {
    let mut app = open_context(workspace_root)?;
    match command {
        ThemeCommand::List => {
            let current = app.theme().current().name.clone();
            println!("Available themes:");
            for name in app.theme().theme_names() {
                let marker = if name == current { "*" } else { " " };
                println!("{marker} {name}");
            }
            println!("Fonts:");
            for font in app.theme().fonts() {
                println!("  {} ({})", font.name, font.class_name);
            }
        }
        ThemeCommand::Select { name } => {
            if !app.update_theme(|theme| theme.select_theme(&name)) {
                let known: Vec<&str> = app.theme().theme_names().collect();
                bail!("unknown theme '{name}' (available: {})", known.join(", "));
            }
            println!("Selected theme '{name}'");
        }
        ThemeCommand::Font(args) => select_font(&mut app, args)?,
        ThemeCommand::Merge { input } => {
            let input = resolve_input_path(&input)?;
            let contents = fs::read_to_string(&input)
                .with_context(|| format!("read theme overrides {}", input.display()))?;
            let overrides: ThemeOverrides = serde_json::from_str(&contents)
                .with_context(|| format!("parse theme overrides {}", input.display()))?;
            app.update_theme(|theme| theme.merge_theme_overrides(overrides));
            println!("Current theme is now '{}'", app.theme().current().name);
        }
        ThemeCommand::Vars => {
            for (property, value) in app.theme().current().css_variables() {
                println!("{property}: {value};");
            }
        }
    }
    Ok(())
}

fn select_font(app: &mut AppContext, args: FontArgs) -> Result<()> {
    if args.cycle {
        let font = app
            .update_theme(|theme| theme.cycle_font())
            .ok_or_else(|| anyhow!("no fonts available"))?;
        println!("Font: {} ({})", font.name, font.class_name);
    } else if let Some(class_name) = args.set {
        if !app.update_theme(|theme| theme.select_font(&class_name)) {
            bail!("unknown font class '{class_name}'");
        }
        println!("Font: {}", app.theme().current().typeface);
    } else {
        let record = app.theme().current();
        println!(
            "Font: {} ({})",
            record.typeface,
            record.typeface_class.as_deref().unwrap_or("-")
        );
    }
    for link in app.theme().font_head().links() {
        println!("Stylesheet: {link}");
    }
    Ok(())
}

fn execute_lang_command(command: LangCommand, workspace_root: &Path) -> Result<()> {
    let mut app = open_context(workspace_root)?;
    match command {
        LangCommand::List => {
            let current = app.language().current();
            for option in app.language().languages() {
                let marker = if option.code == current { "*" } else { " " };
                println!(
                    "{marker} {} {} ({})",
                    option.code, option.native_name, option.name
                );
            }
        }
        LangCommand::Set { code } => {
            let language = parse_language(&code)?;
            app.update_language(|store| store.select_language(language));
            println!("Language set to '{language}'");
        }
        LangCommand::Translate {
            path,
            fallback,
            from,
        } => {
            if let Some(dir) = from {
                let source = DirectorySource::new(resolve_input_path(&dir)?);
                let language = app.language().current();
                app.update_language(|store| store.load_remote_translations(language, &source));
            }
            println!("{}", app.language().translate(&path, fallback.as_deref()));
        }
        LangCommand::Load { code, from } => {
            let language = parse_language(&code)?;
            let source = DirectorySource::new(resolve_input_path(&from)?);
            let outcome =
                app.update_language(|store| store.load_remote_translations(language, &source));
            match outcome {
                LoadOutcome::Applied => println!("Loaded translations for '{language}'"),
                LoadOutcome::Stale => println!("Discarded stale translations for '{language}'"),
                LoadOutcome::Failed => bail!(
                    "failed to load translations for '{language}' from {}",
                    source.path_for(language).display()
                ),
            }
            print_missing(&app, language);
        }
        LangCommand::Missing { code } => {
            let language = parse_language(&code)?;
            print_missing(&app, language);
        }
    }
    Ok(())
}

fn print_missing(app: &AppContext, language: Language) {
    let missing = app.language().missing_keys(language);
    if missing.is_empty() {
        println!("No missing keys for '{language}'.");
        return;
    }
    println!("Missing keys for '{language}':");
    for key in missing {
        println!("  - {key}");
    }
}

fn parse_language(code: &str) -> Result<Language> {
    code.parse::<Language>().map_err(|err| anyhow!(err))
}

fn execute_ui(args: UiArgs) -> Result<()> {
    let mut app = AppContext::new(Arc::new(snapdeck_state::MemoryStorage::new()));
    for raw in &args.actions {
        app.dispatch_ui(parse_ui_action(raw)?);
    }
    let state = app.ui().state();
    println!("modal_open: {}", state.modal_open);
    println!(
        "modal_content: {}",
        state.modal_content.as_deref().unwrap_or("-")
    );
    println!("menu_open: {}", state.menu_open);
    println!("toast_open: {}", state.toast_open);
    println!(
        "toast_message: {}",
        state.toast_message.as_deref().unwrap_or("-")
    );
    println!("toast_kind: {}", state.toast_kind);
    Ok(())
}

fn parse_ui_action(raw: &str) -> Result<UiAction> {
    let (name, argument) = match raw.split_once('=') {
        Some((name, argument)) => (name, Some(argument)),
        None => (raw, None),
    };
    let action = match (name, argument) {
        ("open-modal", content) => UiAction::OpenModal(content.map(str::to_string)),
        ("close-modal", None) => UiAction::CloseModal,
        ("toggle-menu", None) => UiAction::ToggleMenu,
        ("close-menu", None) => UiAction::CloseMenu,
        ("toast", Some(payload)) => {
            let (message, kind) = match payload.rsplit_once(':') {
                Some((message, kind)) => (
                    message,
                    kind.parse::<ToastKind>().map_err(|err| anyhow!(err))?,
                ),
                None => (payload, ToastKind::default()),
            };
            UiAction::ShowToast {
                message: message.to_string(),
                kind,
            }
        }
        ("hide-toast", None) => UiAction::HideToast,
        ("reset", None) => UiAction::ResetAll,
        _ => bail!("unrecognised UI action '{raw}'"),
    };
    Ok(action)
}

fn simulate_sections(args: SimulateArgs) -> Result<()> {
    if args.length <= 0.0 || args.viewport <= 0.0 {
        bail!("--length and --viewport must be positive");
    }
    let config = ContainerConfig {
        axis: args.axis.into(),
        snap: args.snap.into(),
        show_navigation: args.navigation,
        navigation_anchor: NavigationAnchor::Center,
        gap: args.gap,
        ..ContainerConfig::default()
    };
    let children = (0..args.count).map(Child::section).collect();
    let mut container = SectionContainer::new(config, children);
    container.mount(SectionBounds::evenly_spaced(
        args.count,
        args.length,
        args.gap,
    ));

    println!("scroll-snap-type: {}", container.snap_style());
    for offset in &args.offsets {
        let changed = container.on_scroll(*offset, args.viewport);
        let note = if changed.is_some() { " (changed)" } else { "" };
        println!(
            "offset {offset}: active {}{note}",
            container.active_index()
        );
    }
    if let Some(navigation) = container.navigation() {
        let dots: String = navigation
            .dots
            .iter()
            .map(|dot| if dot.active { '●' } else { '○' })
            .collect();
        println!("navigation: {dots}");
    }
    Ok(())
}

fn execute_zone_command(command: ZoneCommand) -> Result<()> {
    match command {
        ZoneCommand::Place { zone, layer } => {
            let zone: Zone = zone.parse()?;
            let layer: Layer = layer.parse()?;
            println!("{}", Placement::new(zone, layer).css());
        }
        ZoneCommand::List => {
            println!("Zones:");
            for zone in Zone::ALL {
                println!("  - {zone}");
            }
            println!("Layers:");
            for layer in Layer::ALL {
                println!("  - {layer} (z-index {})", layer.z_index());
            }
        }
    }
    Ok(())
}

fn storage_dir(workspace_root: &Path) -> PathBuf {
    workspace_root.join(".snapdeck").join("storage")
}

fn resolve_workspace(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(path) => resolve_input_path(&path),
        None => std::env::current_dir().context("determine current directory"),
    }
}

fn resolve_input_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("determine current directory")?
            .join(path))
    }
}
