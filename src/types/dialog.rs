//! Declarative dialog descriptions handed to the presentation layer.
//!
//! The presentation layer renders a `DialogConfig` and sends the entered
//! values back as `DialogData`. Nothing here draws anything.

use std::collections::HashMap;

use super::bookmark::Bookmark;
use super::settings::DisplayOptions;

/// Kind of input a dialog field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Area,
    Check,
}

/// Value of a dialog field, both as default and as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub value: FieldValue,
    /// Separator for multi-value inputs such as tag lists.
    pub separator: Option<String>,
    /// Completion candidates for the field.
    pub dictionary: Vec<String>,
}

impl DialogField {
    fn text(name: &str, label: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind: FieldKind::Text,
            value: FieldValue::Text(value.to_string()),
            separator: None,
            dictionary: Vec::new(),
        }
    }

    fn area(name: &str, label: &str, value: &str) -> Self {
        Self {
            kind: FieldKind::Area,
            ..Self::text(name, label, value)
        }
    }

    fn check(name: &str, label: &str, value: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind: FieldKind::Check,
            value: FieldValue::Flag(value),
            separator: None,
            dictionary: Vec::new(),
        }
    }

    fn tags(label: &str, value: &str, dictionary: Vec<String>) -> Self {
        Self {
            separator: Some(",".to_string()),
            dictionary,
            ..Self::text("tags", label, value)
        }
    }
}

/// A dialog to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogConfig {
    pub title: String,
    pub content: String,
    pub fields: Vec<DialogField>,
    pub show_label: bool,
    pub main_text: String,
    pub second_text: String,
}

impl DialogConfig {
    fn new(title: &str, content: &str, main_text: &str, second_text: &str) -> Self {
        Self {
            title: title.to_string(),
            content: content.to_string(),
            fields: Vec::new(),
            show_label: false,
            main_text: main_text.to_string(),
            second_text: second_text.to_string(),
        }
    }

    pub fn add_bookmark(dictionary: Vec<String>, display: &DisplayOptions) -> Self {
        let mut dialog = Self::new("New Bookmark", "Create a new bookmark", "OK", "Cancel");
        dialog.fields = vec![
            DialogField::text("url", "Url, start with http://...", ""),
            DialogField::text("title", "Custom title (optional)", ""),
            DialogField::area("excerpt", "Custom excerpt (optional)", ""),
            DialogField::tags("Comma separated tags (optional)", "", dictionary),
            DialogField::check("createArchive", "Create archive", display.use_archive),
            DialogField::check(
                "makePublic",
                "Make archive publicly available",
                display.make_public,
            ),
        ];
        dialog
    }

    pub fn edit_bookmark(book: &Bookmark, dictionary: Vec<String>) -> Self {
        let mut dialog = Self::new("Edit Bookmark", "Edit the bookmark's data", "OK", "Cancel");
        dialog.show_label = true;
        dialog.fields = vec![
            DialogField::text("url", "Url", &book.url),
            DialogField::text("title", "Title", &book.title),
            DialogField::area("excerpt", "Excerpt", &book.excerpt),
            DialogField::tags("Tags", &book.tag_line(), dictionary),
            DialogField::check(
                "makePublic",
                "Make archive publicly available",
                book.public >= 1,
            ),
        ];
        dialog
    }

    pub fn delete_bookmarks(count: usize) -> Self {
        if count == 1 {
            Self::new(
                "Delete Bookmark",
                "Are you sure ? This action is irreversible.",
                "Yes",
                "No",
            )
        } else {
            Self::new(
                "Delete Bookmarks",
                "Delete the selected bookmarks ? This action is irreversible.",
                "Yes",
                "No",
            )
        }
    }

    pub fn add_tags(dictionary: Vec<String>) -> Self {
        let mut dialog = Self::new(
            "Add New Tags",
            "Add new tags to selected bookmarks",
            "OK",
            "Cancel",
        );
        dialog.fields = vec![DialogField::tags("Comma separated tags", "", dictionary)];
        dialog
    }

    pub fn update_cache(use_archive: bool) -> Self {
        let mut dialog = Self::new(
            "Update Cache",
            "Update cache for selected bookmarks ? This action is irreversible.",
            "Yes",
            "No",
        );
        dialog.fields = vec![DialogField::check(
            "createArchive",
            "Update archive as well",
            use_archive,
        )];
        dialog
    }

    pub fn rename_tag(tag_name: &str) -> Self {
        let mut dialog = Self::new(
            "Rename Tag",
            &format!("Change the name for tag \"#{}\"", tag_name),
            "OK",
            "Cancel",
        );
        dialog.fields = vec![DialogField::text("newName", "New tag name", tag_name)];
        dialog
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&DialogField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Values submitted from a dialog, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogData {
    values: HashMap<String, FieldValue>,
}

impl DialogData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the defaults of a dialog's fields.
    pub fn from_config(config: &DialogConfig) -> Self {
        let values = config
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect();
        Self { values }
    }

    pub fn with_text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values
            .insert(name.to_string(), FieldValue::Text(value.into()));
        self
    }

    pub fn with_flag(mut self, name: &str, value: bool) -> Self {
        self.values.insert(name.to_string(), FieldValue::Flag(value));
        self
    }

    /// Text value of a field; missing or non-text fields read as empty.
    pub fn text(&self, name: &str) -> &str {
        match self.values.get(name) {
            Some(FieldValue::Text(s)) => s,
            _ => "",
        }
    }

    /// Flag value of a field; missing or non-flag fields read as false.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(FieldValue::Flag(true)))
    }
}

/// State of the tag catalog dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagsDialogState {
    pub visible: bool,
    pub edit_mode: bool,
}

impl TagsDialogState {
    pub fn title(&self) -> &'static str {
        if self.edit_mode {
            "Rename Tags"
        } else {
            "Existing Tags"
        }
    }

    pub fn main_text(&self) -> &'static str {
        if self.edit_mode {
            "Cancel"
        } else {
            "OK"
        }
    }

    pub fn second_text(&self) -> &'static str {
        if self.edit_mode {
            ""
        } else {
            "Rename Tags"
        }
    }

    pub fn open(&mut self) {
        self.edit_mode = false;
        self.visible = true;
    }

    /// Main button: leaves rename mode first, closes otherwise.
    pub fn main_click(&mut self) {
        if self.edit_mode {
            self.edit_mode = false;
        } else {
            self.visible = false;
        }
    }

    pub fn second_click(&mut self) {
        self.edit_mode = true;
    }

    pub fn escape(&mut self) {
        self.visible = false;
        self.edit_mode = false;
    }
}
