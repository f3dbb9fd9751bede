// Fri Jan 17 2026 - Alex

use crate::save::scanner::{indentation, key_of, key_value, opens_block, BlockScanner};
use crate::save::SaveError;
use std::fmt;
use std::str::FromStr;

const ACHIEVEMENT_KEY: &str = "achievement";
const CLUSTERS_KEY: &str = "clusters";
const GALAXY_KEY: &str = "galaxy";
const IRONMAN_KEY: &str = "ironman";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IronmanMode {
    #[default]
    None,
    SetEnable,
    SetDisable,
    ForceAdd,
}

impl IronmanMode {
    fn wanted(&self) -> Option<&'static str> {
        match self {
            IronmanMode::None => None,
            IronmanMode::SetEnable | IronmanMode::ForceAdd => Some("yes"),
            IronmanMode::SetDisable => Some("no"),
        }
    }
}

impl FromStr for IronmanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "none" => Ok(IronmanMode::None),
            "enable" | "set_enable" => Ok(IronmanMode::SetEnable),
            "disable" | "set_disable" => Ok(IronmanMode::SetDisable),
            "force" | "force_add" => Ok(IronmanMode::ForceAdd),
            other => Err(format!("Unknown ironman mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementsEdit {
    Replaced,
    Inserted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IronmanEdit {
    #[default]
    Unchanged,
    Rewritten,
    Inserted,
    Removed,
    Appended,
    NotFound,
}

impl fmt::Display for IronmanEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IronmanEdit::Unchanged => "unchanged",
            IronmanEdit::Rewritten => "rewritten",
            IronmanEdit::Inserted => "inserted",
            IronmanEdit::Removed => "removed",
            IronmanEdit::Appended => "appended",
            IronmanEdit::NotFound => "not found",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamestateOutcome {
    pub lines: Vec<String>,
    pub achievements: Option<AchievementsEdit>,
    pub ironman: IronmanEdit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaOutcome {
    pub lines: Vec<String>,
    pub ironman: IronmanEdit,
}

/// `yes` or `no` when the line is an ironman flag.
fn ironman_value(line: &str) -> Option<&str> {
    match key_value(line) {
        Some((IRONMAN_KEY, v @ ("yes" | "no"))) => Some(v),
        _ => None,
    }
}

/// Rewrites the save's gamestate and meta text.
#[derive(Debug, Clone, Default)]
pub struct GameStateTextPatcher {
    achievements: Option<String>,
    ironman: IronmanMode,
}

impl GameStateTextPatcher {
    pub fn new(ironman: IronmanMode) -> Self {
        Self {
            achievements: None,
            ironman,
        }
    }

    /// Enables the achievements edit with the block to splice in.
    pub fn with_achievements(mut self, block: Option<String>) -> Self {
        self.achievements = block.map(|b| b.replace("\r\n", "\n").trim_end().to_string());
        self
    }

    pub fn process_gamestate(&self, lines: &[String]) -> Result<GamestateOutcome, SaveError> {
        let (has_achievement, has_clusters) = top_level_markers(lines);
        if !has_achievement && !has_clusters {
            return Err(SaveError::Structure(
                "gamestate has neither an achievement nor a clusters block".to_string(),
            ));
        }

        let mut out = Vec::with_capacity(lines.len() + 2);
        let mut top = BlockScanner::new();
        let mut replacing: Option<BlockScanner> = None;
        let mut galaxy: Option<BlockScanner> = None;
        let mut achievements = None;
        let mut ironman = IronmanEdit::NotFound;
        let mut ironman_handled = self.ironman == IronmanMode::None;

        let mut i = 0;
        while i < lines.len() {
            let line = &lines[i];

            if let Some(block) = replacing.as_mut() {
                block.feed(line);
                top.feed(line);
                if block.is_closed() {
                    replacing = None;
                }
                i += 1;
                continue;
            }

            let at_top = top.depth() == 0;

            if let (Some(block), None, true) = (&self.achievements, achievements, at_top) {
                if opens_block(line, ACHIEVEMENT_KEY) {
                    out.push(block.clone());
                    achievements = Some(AchievementsEdit::Replaced);
                    top.feed(line);
                    let scanner = BlockScanner::open(line);
                    if !scanner.is_closed() {
                        replacing = Some(scanner);
                    }
                    i += 1;
                    continue;
                }
                if !has_achievement && opens_block(line, CLUSTERS_KEY) {
                    out.push(block.clone());
                    achievements = Some(AchievementsEdit::Inserted);
                }
            }

            if !ironman_handled && galaxy.is_none() && at_top && opens_block(line, GALAXY_KEY) {
                let scanner = BlockScanner::open(line);
                if !scanner.is_closed() {
                    galaxy = Some(scanner);
                }
                out.push(line.clone());
                top.feed(line);
                i += 1;
                continue;
            }

            if let Some(scanner) = galaxy.as_mut() {
                if !ironman_handled && scanner.depth() == 1 && key_of(line) == Some("name") {
                    ironman_handled = true;
                    out.push(line.clone());
                    scanner.feed(line);
                    top.feed(line);

                    let next = lines.get(i + 1);
                    match next.and_then(|n| ironman_value(n).map(|v| (n, v))) {
                        Some((next, current)) => {
                            match self.ironman.wanted() {
                                Some(wanted) if wanted != current => {
                                    out.push(format!("{}{}={}", indentation(next), IRONMAN_KEY, wanted));
                                    ironman = IronmanEdit::Rewritten;
                                }
                                _ => {
                                    out.push(next.clone());
                                    ironman = IronmanEdit::Unchanged;
                                }
                            }
                            scanner.feed(next);
                            top.feed(next);
                            i += 2;
                        }
                        None => {
                            if self.ironman == IronmanMode::ForceAdd {
                                out.push(format!("{}{}=yes", indentation(line), IRONMAN_KEY));
                                ironman = IronmanEdit::Inserted;
                            }
                            i += 1;
                        }
                    }

                    if scanner.is_closed() {
                        galaxy = None;
                    }
                    continue;
                }

                scanner.feed(line);
                if scanner.is_closed() {
                    galaxy = None;
                }
            }

            out.push(line.clone());
            top.feed(line);
            i += 1;
        }

        if self.ironman == IronmanMode::None {
            ironman = IronmanEdit::Unchanged;
        }

        Ok(GamestateOutcome {
            lines: out,
            achievements,
            ironman,
        })
    }

    /// Flat scan for the ironman flag; meta has no relevant nesting.
    pub fn process_meta(&self, lines: &[String]) -> MetaOutcome {
        let mut out = Vec::with_capacity(lines.len() + 1);
        let mut edit = IronmanEdit::Unchanged;

        match self.ironman {
            IronmanMode::None => out.extend_from_slice(lines),
            IronmanMode::SetDisable => {
                for line in lines {
                    if ironman_value(line) == Some("yes") {
                        edit = IronmanEdit::Removed;
                    } else {
                        out.push(line.clone());
                    }
                }
            }
            IronmanMode::SetEnable | IronmanMode::ForceAdd => {
                let mut seen = false;
                for line in lines {
                    match ironman_value(line) {
                        Some("no") => {
                            out.push(format!("{}{}=yes", indentation(line), IRONMAN_KEY));
                            edit = IronmanEdit::Rewritten;
                            seen = true;
                        }
                        Some(_) => {
                            out.push(line.clone());
                            seen = true;
                        }
                        None => out.push(line.clone()),
                    }
                }
                if !seen {
                    out.push(format!("{}=yes", IRONMAN_KEY));
                    edit = IronmanEdit::Appended;
                }
            }
        }

        MetaOutcome { lines: out, ironman: edit }
    }
}

fn top_level_markers(lines: &[String]) -> (bool, bool) {
    let mut scanner = BlockScanner::new();
    let (mut achievement, mut clusters) = (false, false);

    for line in lines {
        if scanner.depth() == 0 {
            achievement |= opens_block(line, ACHIEVEMENT_KEY);
            clusters |= opens_block(line, CLUSTERS_KEY);
        }
        scanner.feed(line);
    }

    (achievement, clusters)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    fn split(lines: &[String]) -> Vec<String> {
        lines.join("\n").split('\n').map(str::to_string).collect()
    }

    const BLOCK: &str = "achievement={\n  1=yes\n}";

    #[test]
    fn test_block_inserted_before_clusters() {
        let patcher = GameStateTextPatcher::new(IronmanMode::None).with_achievements(Some(BLOCK.into()));
        let outcome = patcher.process_gamestate(&lines(&["foo", "clusters={", "  bar", "}"])).unwrap();

        assert_eq!(outcome.lines, lines(&["foo", BLOCK, "clusters={", "  bar", "}"]));
        assert_eq!(outcome.achievements, Some(AchievementsEdit::Inserted));
    }

    #[test]
    fn test_existing_block_replaced_in_place() {
        let input = lines(&[
            "version=\"3.12\"",
            "achievement={",
            "\t12 14",
            "\t{ nested=yes }",
            "}",
            "clusters={",
            "}",
            "tail=1",
        ]);
        let patcher = GameStateTextPatcher::new(IronmanMode::None).with_achievements(Some(BLOCK.into()));
        let outcome = patcher.process_gamestate(&input).unwrap();

        assert_eq!(outcome.achievements, Some(AchievementsEdit::Replaced));
        assert_eq!(
            outcome.lines,
            lines(&["version=\"3.12\"", BLOCK, "clusters={", "}", "tail=1"])
        );

        let old_block = 4;
        let new_block = BLOCK.lines().count();
        assert_eq!(split(&outcome.lines).len(), input.len() + new_block - old_block);
    }

    #[test]
    fn test_nested_achievement_key_is_not_replaced() {
        let input = lines(&["country={", "\tachievement={", "\t}", "}", "clusters={", "}"]);
        let patcher = GameStateTextPatcher::new(IronmanMode::None).with_achievements(Some(BLOCK.into()));
        let outcome = patcher.process_gamestate(&input).unwrap();

        assert_eq!(outcome.achievements, Some(AchievementsEdit::Inserted));
        assert_eq!(outcome.lines[..4], input[..4]);
        assert_eq!(outcome.lines[4], BLOCK);
    }

    #[test]
    fn test_missing_markers_is_structural_error() {
        let patcher = GameStateTextPatcher::new(IronmanMode::ForceAdd).with_achievements(Some(BLOCK.into()));
        let err = patcher.process_gamestate(&lines(&["foo", "bar"])).unwrap_err();
        assert!(matches!(err, SaveError::Structure(_)));
    }

    fn galaxy_save(ironman: Option<&str>) -> Vec<String> {
        let mut text = vec!["clusters={", "}", "galaxy={", "\ttemplate=\"huge\"", "\tname=\"Milky\""];
        if let Some(line) = ironman {
            text.push(line);
        }
        text.extend(["\tshape=\"elliptical\"", "}", "name=\"outside\""]);
        lines(&text)
    }

    #[test]
    fn test_force_add_inserts_after_name() {
        let patcher = GameStateTextPatcher::new(IronmanMode::ForceAdd);
        let outcome = patcher.process_gamestate(&galaxy_save(None)).unwrap();

        assert_eq!(outcome.ironman, IronmanEdit::Inserted);
        assert_eq!(outcome.lines, galaxy_save(Some("\tironman=yes")));
    }

    #[test]
    fn test_force_add_is_idempotent() {
        let patcher = GameStateTextPatcher::new(IronmanMode::ForceAdd);
        let once = patcher.process_gamestate(&galaxy_save(None)).unwrap();
        let twice = patcher.process_gamestate(&once.lines).unwrap();

        assert_eq!(twice.lines, once.lines);
        assert_eq!(twice.ironman, IronmanEdit::Unchanged);
        assert_eq!(twice.lines.iter().filter(|l| l.trim() == "ironman=yes").count(), 1);
    }

    #[test]
    fn test_existing_flag_rewritten() {
        let disable = GameStateTextPatcher::new(IronmanMode::SetDisable);
        let outcome = disable.process_gamestate(&galaxy_save(Some("\tironman=yes"))).unwrap();
        assert_eq!(outcome.ironman, IronmanEdit::Rewritten);
        assert_eq!(outcome.lines, galaxy_save(Some("\tironman=no")));

        let enable = GameStateTextPatcher::new(IronmanMode::SetEnable);
        let outcome = enable.process_gamestate(&galaxy_save(None)).unwrap();
        assert_eq!(outcome.ironman, IronmanEdit::NotFound);
        assert_eq!(outcome.lines, galaxy_save(None));
    }

    #[test]
    fn test_none_mode_leaves_galaxy_alone() {
        let patcher = GameStateTextPatcher::new(IronmanMode::None);
        let input = galaxy_save(Some("\tironman=yes"));
        let outcome = patcher.process_gamestate(&input).unwrap();
        assert_eq!(outcome.lines, input);
        assert_eq!(outcome.achievements, None);
    }

    #[test]
    fn test_meta_force_add_appends() {
        let patcher = GameStateTextPatcher::new(IronmanMode::ForceAdd);
        let outcome = patcher.process_meta(&lines(&["version=1", "somekey=val"]));
        assert_eq!(outcome.lines, lines(&["version=1", "somekey=val", "ironman=yes"]));
        assert_eq!(outcome.ironman, IronmanEdit::Appended);
    }

    #[test]
    fn test_meta_enable_and_disable() {
        let enable = GameStateTextPatcher::new(IronmanMode::SetEnable);
        let outcome = enable.process_meta(&lines(&["version=1", "ironman=no"]));
        assert_eq!(outcome.lines, lines(&["version=1", "ironman=yes"]));

        let disable = GameStateTextPatcher::new(IronmanMode::SetDisable);
        let outcome = disable.process_meta(&lines(&["version=1", "ironman=yes", "x=2"]));
        assert_eq!(outcome.lines, lines(&["version=1", "x=2"]));
        assert_eq!(outcome.ironman, IronmanEdit::Removed);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("force-add".parse::<IronmanMode>().unwrap(), IronmanMode::ForceAdd);
        assert_eq!("disable".parse::<IronmanMode>().unwrap(), IronmanMode::SetDisable);
        assert!("maybe".parse::<IronmanMode>().is_err());
    }
}
