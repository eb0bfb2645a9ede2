use anyhow::Result;
use qol_systray::tray::platform;
use qol_systray::{ItemConfig, MenuItem, Systray, TrayConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    log::info!("Starting QoL Systray...");

    let config = TrayConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config, using defaults: {:#}", e);
        TrayConfig::default()
    });

    let backend = platform::create_backend(&config)?;
    let tray = Systray::with_config(backend, &config);

    let handle = tray.clone();
    tray.run(move || {
        let (items, quit) = build_menu(&handle, &config);
        if platform::HAS_NATIVE_BACKEND {
            listen(&handle, items, &quit);
        } else {
            print_menu(&handle);
            handle.quit();
        }
    });

    log::info!("QoL Systray exited");
    Ok(())
}

fn build_menu(tray: &Systray, config: &TrayConfig) -> (Vec<MenuItem>, MenuItem) {
    let specs = if config.items.is_empty() {
        default_items()
    } else {
        config.items.clone()
    };

    let items: Vec<MenuItem> = specs.iter().map(|spec| add_item(tray, spec)).collect();
    let quit = tray.add_menu_item("Quit", "Quit QoL Systray", None);
    (items, quit)
}

fn add_item(tray: &Systray, spec: &ItemConfig) -> MenuItem {
    let mut item = tray.add_menu_item(&spec.title, &spec.tooltip, None);
    if spec.separator {
        item.set_separator(true);
    }
    if spec.disabled {
        item.disable();
    }
    if spec.checked {
        item.check();
    }
    item
}

fn default_items() -> Vec<ItemConfig> {
    vec![
        ItemConfig {
            title: "Enabled".into(),
            tooltip: "Click to toggle".into(),
            checked: true,
            ..Default::default()
        },
        ItemConfig {
            separator: true,
            ..Default::default()
        },
    ]
}

fn listen(tray: &Systray, mut items: Vec<MenuItem>, quit: &MenuItem) {
    let clicks = tray.clicks();

    while let Some(clicked) = clicks.recv() {
        if clicked.id == quit.id() {
            log::info!("Quit requested");
            tray.quit();
            return;
        }

        let Some(item) = items.iter_mut().find(|item| item.id() == clicked.id) else {
            continue;
        };
        if item.checked() {
            item.uncheck();
        } else {
            item.check();
        }
        log::info!("Toggled {:?}: {}", item.title(), item.checked());
    }
}

fn print_menu(tray: &Systray) {
    match serde_json::to_string_pretty(&tray.items()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize menu: {}", e),
    }
}
