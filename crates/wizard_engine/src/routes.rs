//! Fixed "go to page" lookup for wizard types.

/// A page link offered after a wizard completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    /// Button text.
    pub label: &'static str,
    /// Application path.
    pub path: &'static str,
}

const PROJECTS: PageLink = PageLink {
    label: "Go to projects",
    path: "/projects",
};
const NOTES: PageLink = PageLink {
    label: "Go to notes",
    path: "/notes",
};
const TODOS: PageLink = PageLink {
    label: "Go to todos",
    path: "/todos",
};
const DEVLOG: PageLink = PageLink {
    label: "Go to dev log",
    path: "/devlog",
};
const FEATURES: PageLink = PageLink {
    label: "Go to features",
    path: "/features",
};
const IDEAS: PageLink = PageLink {
    label: "Go to ideas",
    path: "/ideas",
};
const STACK: PageLink = PageLink {
    label: "Go to stack",
    path: "/stack",
};
const SETTINGS: PageLink = PageLink {
    label: "Go to settings",
    path: "/settings",
};
const DEPLOYMENT: PageLink = PageLink {
    label: "Go to deployment",
    path: "/deployment",
};

/// Returns the page a wizard type links to, if any.
pub fn page_for(wizard_type: &str) -> Option<PageLink> {
    let link = match wizard_type {
        "new_project" | "edit_project" | "project_selector" => PROJECTS,
        "add_note" | "edit_note" => NOTES,
        "add_todo" | "edit_todo" => TODOS,
        "add_devlog" | "edit_devlog" => DEVLOG,
        "add_component" | "edit_component" | "edit_relationship_type" => FEATURES,
        "add_idea" | "edit_idea" => IDEAS,
        "add_stack" | "edit_stack" => STACK,
        "edit_settings" | "theme_selector" => SETTINGS,
        "add_deployment" | "edit_deployment" => DEPLOYMENT,
        _ => return None,
    };
    Some(link)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn known_types_map_to_pages() {
        assert_eq!(page_for("new_project").map(|link| link.path), Some("/projects"));
        assert_eq!(
            page_for("edit_relationship_type").map(|link| link.path),
            Some("/features")
        );
        assert_eq!(page_for("add_todo"), Some(TODOS));
    }

    #[test]
    fn unknown_types_have_no_page() {
        assert_eq!(page_for("delete_note_confirm"), None);
        assert_eq!(page_for(""), None);
    }
}
