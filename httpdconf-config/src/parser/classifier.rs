//! Active-line classification
//!
//! Decides, line by line, whether the server would process a line. Two
//! trackers run side by side:
//!
//! - `<IfModule>` blocks whose module test fails exclude everything up to
//!   their matching close, nested `IfModule` tags included.
//! - `<VirtualHost>` blocks are excluded when the caller asks for it.
//!
//! The regions may overlap, so each tracker advances on its own tags even
//! while the other one decides the result.

use crate::parser::defines::DefineTable;
use crate::parser::patterns;
use httpdconf_core::{ConfigurationLine, ModuleInventory, ParsableLine};

/// Exclusion state carried from one line to the next
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExclusionState {
    /// Open `IfModule` tags since the exclusion began
    pub if_module_depth: u32,
    /// Inside a failed `IfModule` test
    pub excluding_by_module: bool,
    /// Inside an excluded `VirtualHost`
    pub vhost_excluded: bool,
}

impl ExclusionState {
    /// Advance over one processed line and report whether it is active
    pub fn advance(&mut self, line: &str, modules: &ModuleInventory, include_virtual_hosts: bool) -> bool {
        let is_comment = patterns::is_comment(line);

        if !is_comment {
            if patterns::is_if_module_open_negated(line) {
                // `!X` holds when X is not loaded, so exclude when it is.
                self.open_if_module(|| module_argument(line).is_some_and(|m| modules.is_loaded(m)));
            } else if patterns::is_if_module_open(line) {
                self.open_if_module(|| !module_argument(line).is_some_and(|m| modules.is_loaded(m)));
            }

            if !include_virtual_hosts && patterns::is_vhost_open(line) {
                self.vhost_excluded = true;
            }
        }

        let active = !self.excluding_by_module && !self.vhost_excluded;

        if !is_comment {
            if self.excluding_by_module && patterns::is_if_module_close(line) {
                self.if_module_depth = self.if_module_depth.saturating_sub(1);
                if self.if_module_depth == 0 {
                    self.excluding_by_module = false;
                }
            }

            if self.vhost_excluded && patterns::is_vhost_close(line) {
                self.vhost_excluded = false;
            }
        }

        active
    }

    fn open_if_module(&mut self, excludes: impl FnOnce() -> bool) {
        if self.excluding_by_module {
            self.if_module_depth += 1;
        } else if excludes() {
            self.excluding_by_module = true;
            self.if_module_depth = 1;
        }
    }
}

fn module_argument(line: &str) -> Option<&str> {
    patterns::if_module_argument(line).filter(|arg| !arg.is_empty())
}

/// Classify every line as active or inactive.
///
/// Each line's processed text is Define-substituted before it is tested; the
/// returned lines carry the substituted text.
pub fn classify(
    lines: &[ConfigurationLine],
    defines: &DefineTable,
    modules: &ModuleInventory,
    include_virtual_hosts: bool,
) -> Vec<ParsableLine> {
    let mut state = ExclusionState::default();

    lines
        .iter()
        .map(|line| {
            let processed = if defines.is_empty() {
                line.processed.clone()
            } else {
                defines.substitute(&line.processed)
            };
            let active = state.advance(&processed, modules, include_virtual_hosts);
            ParsableLine::new(line.with_processed(processed), active)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::defines::Define;

    fn lines(text: &str) -> Vec<ConfigurationLine> {
        text.lines()
            .enumerate()
            .map(|(i, l)| ConfigurationLine::new(l, "/etc/httpd/conf/httpd.conf", i + 1))
            .collect()
    }

    fn activity(text: &str, modules: &ModuleInventory, include_virtual_hosts: bool) -> Vec<bool> {
        classify(&lines(text), &DefineTable::empty(), modules, include_virtual_hosts)
            .into_iter()
            .map(|l| l.active)
            .collect()
    }

    fn core_only() -> ModuleInventory {
        ModuleInventory::new(["core"], Vec::<String>::new())
    }

    #[test]
    fn test_negated_if_module_of_loaded_module_is_excluded() {
        let result = activity(
            "<IfModule !core_module>\nListen 81\n</IfModule>\nListen 80",
            &core_only(),
            true,
        );
        assert_eq!(result, vec![false, false, false, true]);
    }

    #[test]
    fn test_negated_if_module_of_missing_module_is_active() {
        let result = activity(
            "<IfModule !mod_ssl.c>\nListen 81\n</IfModule>",
            &core_only(),
            true,
        );
        assert_eq!(result, vec![true, true, true]);
    }

    #[test]
    fn test_if_module_checks_both_sets() {
        let modules = ModuleInventory::new(["core_module"], ["ssl_module"]);
        let result = activity(
            "<IfModule mod_ssl.c>\nListen 443\n</IfModule>\n<IfModule status_module>\nExtendedStatus On\n</IfModule>",
            &modules,
            true,
        );
        assert_eq!(result, vec![true, true, true, false, false, false]);
    }

    #[test]
    fn test_nested_if_modules_any_depth() {
        for depth in 1..=6 {
            let mut text = String::new();
            for i in 0..depth {
                // Mix polarities; the outermost one fails.
                if i == 0 {
                    text.push_str("<IfModule missing_module>\n");
                } else if i % 2 == 0 {
                    text.push_str("<IfModule core_module>\n");
                } else {
                    text.push_str("<IfModule !other_module>\n");
                }
            }
            text.push_str("Listen 81\n");
            for _ in 0..depth {
                text.push_str("</IfModule>\n");
            }
            text.push_str("Listen 80\n");

            let result = activity(&text, &core_only(), true);
            let inner = 2 * depth + 1;
            assert!(result[..inner].iter().all(|a| !a), "depth {depth}: {result:?}");
            assert!(result[inner], "depth {depth}: {result:?}");
        }
    }

    #[test]
    fn test_passing_if_module_nested_in_passing() {
        let result = activity(
            "<IfModule core_module>\n<IfModule !missing_module>\nA 1\n</IfModule>\nB 2\n</IfModule>\nC 3",
            &core_only(),
            true,
        );
        assert!(result.iter().all(|a| *a));
    }

    #[test]
    fn test_virtual_host_exclusion() {
        let text = "<VirtualHost *:80>\nServerName a.example\n</VirtualHost>\nServerName b.example";
        assert_eq!(activity(text, &core_only(), false), vec![false, false, false, true]);
        assert_eq!(activity(text, &core_only(), true), vec![true, true, true, true]);
    }

    #[test]
    fn test_overlapping_trackers_stay_in_sync() {
        let text = "<VirtualHost *:80>\n\
                    <IfModule missing_module>\n\
                    A 1\n\
                    </IfModule>\n\
                    B 2\n\
                    </VirtualHost>\n\
                    <IfModule missing_module>\n\
                    <VirtualHost *:81>\n\
                    C 3\n\
                    </VirtualHost>\n\
                    </IfModule>\n\
                    D 4";
        let excluded = activity(text, &core_only(), false);
        assert_eq!(excluded[..11], [false; 11]);
        assert!(excluded[11]);

        let included = activity(text, &core_only(), true);
        assert_eq!(
            included,
            vec![true, false, false, false, true, true, false, false, false, false, false, true]
        );
    }

    #[test]
    fn test_comments_never_trigger() {
        let result = activity(
            "# <IfModule missing_module>\nListen 80\n# <VirtualHost *:80>\nListen 81",
            &core_only(),
            false,
        );
        assert_eq!(result, vec![true, true, true, true]);
    }

    #[test]
    fn test_unterminated_if_module_runs_to_end() {
        let result = activity("<IfModule missing_module>\nListen 80\nListen 81", &core_only(), true);
        assert_eq!(result, vec![false, false, false]);
    }

    #[test]
    fn test_defines_are_substituted_before_matching() {
        let defines = DefineTable::new(vec![Define::new("MOD", "missing_module")]);
        let classified = classify(
            &lines("<IfModule ${MOD}>\nListen 81\n</IfModule>"),
            &defines,
            &core_only(),
            true,
        );
        assert_eq!(classified[0].line.processed, "<IfModule missing_module>");
        assert_eq!(classified[0].line.raw, "<IfModule ${MOD}>");
        assert!(classified.iter().all(|l| !l.active));
    }
}
