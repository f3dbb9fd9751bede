// Tue Jan 13 2026 - Alex

use colored::*;

pub struct Banner {
    title: String,
    subtitle: Option<String>,
    version: Option<String>,
    style: BannerStyle,
    use_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerStyle {
    Fancy,
    Minimal,
}

impl Banner {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            subtitle: None,
            version: None,
            style: BannerStyle::Fancy,
            use_color: true,
        }
    }

    pub fn with_subtitle(mut self, subtitle: &str) -> Self {
        self.subtitle = Some(subtitle.to_string());
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn with_style(mut self, style: BannerStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    pub fn render(&self) -> String {
        match self.style {
            BannerStyle::Fancy => self.render_fancy(),
            BannerStyle::Minimal => self.render_minimal(),
        }
    }

    pub fn print(&self) {
        println!("{}", self.render());
    }

    fn render_fancy(&self) -> String {
        let ascii_art = r#"
  ____  ____  __  __    ____       _       _
 |  _ \|  _ \ \ \/ /   |  _ \ __ _| |_ ___| |__   ___ _ __
 | |_) | | | | \  /    | |_) / _` | __/ __| '_ \ / _ \ '__|
 |  __/| |_| | /  \    |  __/ (_| | || (__| | | |  __/ |
 |_|   |____/ /_/\_\   |_|   \__,_|\__\___|_| |_|\___|_|
        "#;

        let mut lines = Vec::new();

        for line in ascii_art.lines() {
            if self.use_color {
                lines.push(line.cyan().bold().to_string());
            } else {
                lines.push(line.to_string());
            }
        }

        let info = [self.subtitle.clone(), self.version.as_ref().map(|v| format!("v{}", v))]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("  ");

        if !info.is_empty() {
            let centered = format!("{:^60}", info);
            if self.use_color {
                lines.push(centered.yellow().to_string());
            } else {
                lines.push(centered);
            }
        }

        lines.push(String::new());
        lines.join("\n")
    }

    fn render_minimal(&self) -> String {
        let mut line = if self.use_color {
            self.title.cyan().bold().to_string()
        } else {
            self.title.clone()
        };

        if let Some(version) = &self.version {
            line.push_str(&format!(" v{}", version));
        }

        line
    }
}

impl Default for Banner {
    fn default() -> Self {
        Self::new("PDX Patcher")
            .with_subtitle("Achievement enabler and save repair")
            .with_version(env!("CARGO_PKG_VERSION"))
    }
}
