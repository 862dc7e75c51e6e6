// This file is part of Bubble Picker.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;

use anyhow::{Context, Result};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::Parser;

use bubble_picker::core::adapter::{merge_item_sets, random_items};
use bubble_picker::core::item::ItemSetFile;
use bubble_picker::{BubblePickerAppPlugin, Mode, PickerConfig, PickerItems};

#[derive(Parser, Debug)]
#[command(author, version, about = "Force-driven bubble picker", long_about = None)]
struct Args {
    /// Config layers; later files override earlier ones key by key.
    #[arg(long = "config", default_values = ["assets/config/picker.ron", "assets/config/picker.local.ron"])]
    config: Vec<PathBuf>,
    /// RON item set with `main` and `secondary` lists.
    #[arg(long, default_value = "assets/items/demo.ron")]
    items: PathBuf,
    /// Generate this many random items instead of reading `--items`.
    #[arg(long)]
    random: Option<usize>,
    /// Start in secondary mode.
    #[arg(long)]
    secondary: bool,
}

/// Messages gathered before logging is up; emitted at startup.
#[derive(Resource, Debug, Default)]
struct LoadReport {
    used: Vec<String>,
    issues: Vec<String>,
    item_count: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (mut cfg, used, mut issues) = PickerConfig::load_layered(&args.config);
    issues.extend(cfg.validate());
    if args.secondary {
        cfg.selection.start_mode = Mode::Secondary;
    }

    let items = match args.random {
        Some(count) => random_items(count, &mut rand::thread_rng()),
        None => {
            let set = ItemSetFile::load_from_file(&args.items)
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("load items {:?}", args.items))?;
            merge_item_sets(set.main, set.secondary)
        }
    };

    let report = LoadReport {
        used,
        issues,
        item_count: items.len(),
    };

    #[allow(unused_mut)]
    let mut log = LogPlugin::default();
    #[cfg(feature = "debug")]
    {
        log.filter = format!("{},bubble_picker=debug", log.filter);
    }

    let exit = App::new()
        .insert_resource(cfg.clone())
        .insert_resource(report)
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: cfg.window.title.clone(),
                        resolution: (cfg.window.width, cfg.window.height).into(),
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(log),
        )
        .add_plugins(BubblePickerAppPlugin)
        .insert_resource(PickerItems(items))
        .add_systems(Startup, log_load_report)
        .run();
    match exit {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => anyhow::bail!("picker exited with code {code}"),
    }
}

fn log_load_report(report: Res<LoadReport>) {
    for issue in &report.issues {
        warn!("CONFIG ISSUE: {issue}");
    }
    if report.used.is_empty() {
        info!("No config layers found; using defaults");
    } else {
        info!(used = ?report.used, "Config layers loaded");
    }
    info!("{} items loaded", report.item_count);
}
