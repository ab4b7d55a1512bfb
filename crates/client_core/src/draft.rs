use shared::{
    domain::{Category, MediaType},
    protocol::{DraftPayload, EtcField},
};

/// In-memory draft under authoring. Setters are total; whether edits are
/// accepted at all is decided by the lifecycle controller, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftForm {
    title: String,
    content: String,
    media_type: Option<MediaType>,
    category: Option<Category>,
    etc_fields: Vec<EtcField>,
}

impl DraftForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn set_media_type(&mut self, media_type: MediaType) {
        self.media_type = Some(media_type);
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = Some(category);
    }

    pub fn push_etc_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.etc_fields.push(EtcField {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Returns false when the index is out of range.
    pub fn update_etc_field(
        &mut self,
        index: usize,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> bool {
        let Some(field) = self.etc_fields.get_mut(index) else {
            return false;
        };
        field.name = name.into();
        field.value = value.into();
        true
    }

    /// Returns false when the index is out of range.
    pub fn remove_etc_field(&mut self, index: usize) -> bool {
        if index >= self.etc_fields.len() {
            return false;
        }
        self.etc_fields.remove(index);
        true
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn media_type(&self) -> Option<MediaType> {
        self.media_type
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn etc_fields(&self) -> &[EtcField] {
        &self.etc_fields
    }

    /// Recomputed on every read; never cached.
    pub fn is_submittable(&self) -> bool {
        !self.title.is_empty()
            && !self.content.is_empty()
            && self.media_type.is_some()
            && self.category.is_some()
    }

    /// Wire payload for create/update. None while any required field is
    /// missing.
    pub fn payload(&self) -> Option<DraftPayload> {
        let media_type = self.media_type?;
        let category = self.category?;
        if self.title.is_empty() || self.content.is_empty() {
            return None;
        }
        Some(DraftPayload {
            title: self.title.clone(),
            content: self.content.clone(),
            media_type,
            category,
            etc_fields: self.etc_fields.clone(),
        })
    }
}
