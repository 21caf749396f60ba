//! Ownership of the single injected theme stylesheet node.

use crate::host::{StyleNodeId, StylesheetHost};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// The one theme stylesheet the output runtime may have injected.
///
/// Every mutation removes the previous node before inserting, so at most one node exists no
/// matter how often a theme is re-applied. Each activation takes a generation from
/// [`ThemeStylesheet::begin`]; completions holding an older generation must be dropped.
pub struct ThemeStylesheet {
    active: Option<(StyleNodeId, String)>,
    generation: u64,
}

impl ThemeStylesheet {
    /// Starts a new activation: removes the injected node and returns the activation's
    /// generation.
    pub fn begin(&mut self, host: &dyn StylesheetHost) -> u64 {
        self.clear(host);
        self.generation += 1;
        self.generation
    }

    /// Whether `generation` belongs to the latest activation.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Theme id of the injected node.
    pub fn active_theme(&self) -> Option<&str> {
        self.active.as_ref().map(|(_, theme_id)| theme_id.as_str())
    }

    /// Removes the injected node, if any.
    pub fn clear(&mut self, host: &dyn StylesheetHost) {
        if let Some((node, _)) = self.active.take() {
            host.remove_style(node);
        }
    }

    /// Replaces the injected node with one for `theme_id`.
    ///
    /// # Errors
    ///
    /// Returns the host error when insertion fails; the old node is gone either way.
    pub fn replace(
        &mut self,
        host: &dyn StylesheetHost,
        theme_id: &str,
        css: &str,
    ) -> Result<(), String> {
        self.clear(host);
        let node = host.insert_style(theme_id, css)?;
        self.active = Some((node, theme_id.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::host::MemoryStylesheetHost;

    #[test]
    fn replacing_twice_leaves_one_node() {
        let host = MemoryStylesheetHost::default();
        let mut sheet = ThemeStylesheet::default();

        sheet.replace(&host, "custom-ocean", "css-1").expect("first");
        sheet.replace(&host, "custom-ocean", "css-1").expect("second");

        let nodes = host.nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].css, "css-1");
        assert_eq!(sheet.active_theme(), Some("custom-ocean"));
    }

    #[test]
    fn begin_supersedes_earlier_generations() {
        let host = MemoryStylesheetHost::default();
        let mut sheet = ThemeStylesheet::default();
        sheet.replace(&host, "custom-ocean", "css").expect("insert");

        let first = sheet.begin(&host);
        let second = sheet.begin(&host);
        assert!(host.nodes().is_empty());
        assert!(!sheet.is_current(first));
        assert!(sheet.is_current(second));
    }

    #[test]
    fn clear_removes_node() {
        let host = MemoryStylesheetHost::default();
        let mut sheet = ThemeStylesheet::default();
        sheet.replace(&host, "custom-ocean", "css").expect("insert");
        sheet.clear(&host);
        sheet.clear(&host);
        assert!(host.nodes().is_empty());
        assert_eq!(sheet.active_theme(), None);
    }
}
