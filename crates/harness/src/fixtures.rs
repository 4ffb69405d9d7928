//! Entity types used across the integration tests, modelled on a small art
//! community site: users with a profile picture, characters with a gallery,
//! and tags that hold a reserved token until they are deleted.

use std::sync::LazyLock;

use rowkeep_core::{ColumnValue, FromColumn, RecordId};
use rowkeep_record::{
    Attachments, Entity, HasImage, HasImageSet, Image, Record, RecordError, StoredImage,
    properties, transform,
};
use rowkeep_storage::{Equals, QueryExecutor};

pub const PROFILE_PICTURES: &str = "profile_pictures";
pub const CHARACTER_IMAGES: &str = "character_images";

pub const SCHEMA_SQL: &str = "
CREATE TABLE USERS (
    ID INTEGER PRIMARY KEY,
    USERNAME TEXT NOT NULL,
    EMAIL TEXT,
    FILE_TOKEN TEXT NOT NULL,
    PICTURE_LOC TEXT,
    PICTURE_NSFW INTEGER NOT NULL DEFAULT 0,
    NSFW INTEGER NOT NULL DEFAULT 0,
    COLOR BLOB,
    NICK TEXT NOT NULL DEFAULT '',
    SUSPENDED INTEGER NOT NULL DEFAULT 0,
    DELETED INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE CHARACTERS (
    ID INTEGER PRIMARY KEY,
    USER_ID INTEGER NOT NULL REFERENCES USERS (ID),
    CHARACTER_TOKEN TEXT NOT NULL,
    NAME TEXT NOT NULL,
    DESCRIPTION TEXT NOT NULL DEFAULT '',
    COLOR BLOB,
    PUBLIC INTEGER NOT NULL DEFAULT 0,
    DELETED INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE CHARACTER_IMAGES (
    ID INTEGER PRIMARY KEY,
    CHARACTER_ID INTEGER NOT NULL REFERENCES CHARACTERS (ID),
    CAPTION TEXT NOT NULL DEFAULT '',
    PATH TEXT NOT NULL,
    NSFW INTEGER NOT NULL DEFAULT 0,
    SORT INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE TAGS (
    ID INTEGER PRIMARY KEY,
    LABEL TEXT NOT NULL,
    RESERVED_TOKEN TEXT,
    DELETED INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE RELEASED_TOKENS (
    ID INTEGER PRIMARY KEY,
    TOKEN TEXT NOT NULL
);
";

// ============================================================================
// User
// ============================================================================

pub struct User;

properties! {
    pub enum UserProperty {
        Username => "USERNAME" as Text;
        Email => "EMAIL" as Text;
        FileToken => "FILE_TOKEN" as Text;
        PictureLoc => "PICTURE_LOC" as Text;
        PictureNsfw => "PICTURE_NSFW" as Integer;
        Nsfw => "NSFW" as Integer, read = transform::integer_to_bool, write = transform::bool_to_integer;
        Color => "COLOR", read = transform::bytes_to_hex, write = transform::hex_to_bytes;
        Nick => "NICK" as Text, write = transform::trim_text;
        Suspended => "SUSPENDED" as Integer;
        Deleted => "DELETED" as Integer;
    }
}

#[derive(Debug, Clone)]
pub struct UserDraft {
    pub username: String,
    pub email: Option<String>,
    pub file_token: String,
    pub nick: String,
    /// Hex, e.g. `"1a2b3c"`.
    pub color: Option<String>,
    pub picture: Option<String>,
    pub picture_nsfw: bool,
}

impl UserDraft {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            email: None,
            file_token: format!("{username}0tok"),
            nick: username.to_string(),
            color: None,
            picture: None,
            picture_nsfw: false,
        }
    }
}

static USER_DELETED: LazyLock<Vec<(&'static str, ColumnValue)>> = LazyLock::new(|| {
    vec![
        ("EMAIL", ColumnValue::Null),
        ("NICK", ColumnValue::from("Deleted user")),
        ("PICTURE_LOC", ColumnValue::Null),
        ("PICTURE_NSFW", ColumnValue::from(false)),
        ("COLOR", ColumnValue::Null),
        ("DELETED", ColumnValue::from(true)),
    ]
});

impl Entity for User {
    const TABLE: &'static str = "USERS";
    type Property = UserProperty;
    type Draft = UserDraft;

    fn deleted_values() -> &'static [(&'static str, ColumnValue)] {
        USER_DELETED.as_slice()
    }

    fn create(
        storage: &mut dyn QueryExecutor,
        draft: UserDraft,
    ) -> Result<Record<Self>, RecordError> {
        let color = transform::hex_to_bytes(ColumnValue::from(draft.color))?;
        Record::insert(
            storage,
            &[
                ("USERNAME", draft.username.into()),
                ("EMAIL", draft.email.into()),
                ("FILE_TOKEN", draft.file_token.into()),
                ("NICK", draft.nick.into()),
                ("COLOR", color),
                ("PICTURE_LOC", draft.picture.into()),
                ("PICTURE_NSFW", draft.picture_nsfw.into()),
            ],
        )
    }

    /// A restored session must still point at a live, unsuspended account.
    fn verify_restored(
        record: &mut Record<Self>,
        storage: &dyn QueryExecutor,
    ) -> Result<(), RecordError> {
        if record.is(storage, UserProperty::Deleted)? {
            return Err(RecordError::NotFound {
                id: record.id().get(),
                table: Self::TABLE,
            });
        }
        if record.is(storage, UserProperty::Suspended)? {
            return Err(RecordError::Verification(format!(
                "user {} is suspended",
                record.id()
            )));
        }
        Ok(())
    }

    fn attachments() -> Attachments<Self> {
        Attachments::none().with_image()
    }
}

impl HasImage for User {
    fn image(
        record: &mut Record<Self>,
        storage: &dyn QueryExecutor,
    ) -> Result<Box<dyn Image>, RecordError> {
        let token: String = record.get_as(storage, UserProperty::FileToken)?;
        let path: Option<String> = record.get_as(storage, UserProperty::PictureLoc)?;
        let nsfw = record.is(storage, UserProperty::PictureNsfw)?;
        Ok(Box::new(StoredImage::new(PROFILE_PICTURES, token, path, nsfw)))
    }
}

// ============================================================================
// Character
// ============================================================================

pub struct Character;

properties! {
    pub enum CharacterProperty {
        Owner => "USER_ID" as Integer;
        Token => "CHARACTER_TOKEN" as Text;
        Name => "NAME" as Text;
        Description => "DESCRIPTION" as Text;
        Color => "COLOR", read = transform::bytes_to_hex, write = transform::hex_to_bytes;
        Public => "PUBLIC" as Integer, read = transform::integer_to_bool, write = transform::bool_to_integer;
        Deleted => "DELETED" as Integer;
    }
}

#[derive(Debug, Clone)]
pub struct CharacterImageDraft {
    /// Suffix appended to the character token to form the file name.
    pub path: String,
    pub caption: String,
    pub nsfw: bool,
}

#[derive(Debug, Clone)]
pub struct CharacterDraft {
    pub owner: RecordId,
    pub token: String,
    pub name: String,
    pub description: String,
    pub color: Option<String>,
    pub public: bool,
    pub images: Vec<CharacterImageDraft>,
}

static CHARACTER_DELETED: LazyLock<Vec<(&'static str, ColumnValue)>> = LazyLock::new(|| {
    vec![
        ("NAME", ColumnValue::from("Deleted character")),
        ("DESCRIPTION", ColumnValue::from("")),
        ("PUBLIC", ColumnValue::from(false)),
        ("DELETED", ColumnValue::from(true)),
    ]
});

impl Entity for Character {
    const TABLE: &'static str = "CHARACTERS";
    type Property = CharacterProperty;
    type Draft = CharacterDraft;

    fn deleted_values() -> &'static [(&'static str, ColumnValue)] {
        CHARACTER_DELETED.as_slice()
    }

    fn create(
        storage: &mut dyn QueryExecutor,
        draft: CharacterDraft,
    ) -> Result<Record<Self>, RecordError> {
        let color = transform::hex_to_bytes(ColumnValue::from(draft.color))?;
        let record = Record::<Self>::insert(
            storage,
            &[
                ("USER_ID", draft.owner.get().into()),
                ("CHARACTER_TOKEN", draft.token.into()),
                ("NAME", draft.name.into()),
                ("DESCRIPTION", draft.description.into()),
                ("COLOR", color),
                ("PUBLIC", draft.public.into()),
            ],
        )?;
        // Not atomic: a failed image insert leaves the character row behind.
        for (sort, image) in draft.images.into_iter().enumerate() {
            storage.insert(
                "CHARACTER_IMAGES",
                &[
                    ("CHARACTER_ID", record.id().get().into()),
                    ("CAPTION", image.caption.into()),
                    ("PATH", image.path.into()),
                    ("NSFW", image.nsfw.into()),
                    ("SORT", (sort as i64).into()),
                ],
            )?;
        }
        Ok(record)
    }

    fn attachments() -> Attachments<Self> {
        Attachments::none().with_image_set()
    }
}

impl HasImageSet for Character {
    fn image_set(
        record: &mut Record<Self>,
        storage: &dyn QueryExecutor,
    ) -> Result<Vec<Box<dyn Image>>, RecordError> {
        let token: String = record.get_as(storage, CharacterProperty::Token)?;
        let rows = storage.select(
            "CHARACTER_IMAGES",
            &["PATH", "NSFW"],
            &Equals::new("CHARACTER_ID", record.id().get()),
        )?;

        let mut images: Vec<Box<dyn Image>> = Vec::with_capacity(rows.len());
        for mut row in rows {
            let path = Option::<String>::from_column(row.take("PATH").unwrap_or(ColumnValue::Null))?;
            let nsfw = row.take("NSFW").is_some_and(|v| v.truthy());
            images.push(Box::new(StoredImage::new(
                CHARACTER_IMAGES,
                token.clone(),
                path,
                nsfw,
            )));
        }
        Ok(images)
    }
}

// ============================================================================
// Tag
// ============================================================================

pub struct Tag;

properties! {
    pub enum TagProperty {
        Label => "LABEL" as Text, write = transform::trim_text;
        ReservedToken => "RESERVED_TOKEN" as Text;
        Deleted => "DELETED" as Integer;
    }
}

#[derive(Debug, Clone)]
pub struct TagDraft {
    pub label: String,
    pub reserved_token: Option<String>,
}

static TAG_DELETED: LazyLock<Vec<(&'static str, ColumnValue)>> = LazyLock::new(|| {
    vec![
        ("LABEL", ColumnValue::from("")),
        ("RESERVED_TOKEN", ColumnValue::Null),
        ("DELETED", ColumnValue::from(true)),
    ]
});

impl Entity for Tag {
    const TABLE: &'static str = "TAGS";
    type Property = TagProperty;
    type Draft = TagDraft;

    fn deleted_values() -> &'static [(&'static str, ColumnValue)] {
        TAG_DELETED.as_slice()
    }

    fn create(storage: &mut dyn QueryExecutor, draft: TagDraft) -> Result<Record<Self>, RecordError> {
        Record::insert(
            storage,
            &[
                ("LABEL", draft.label.into()),
                ("RESERVED_TOKEN", draft.reserved_token.into()),
            ],
        )
    }

    /// Hand the reserved token back before the tombstone clears it.
    fn before_delete(
        record: &mut Record<Self>,
        storage: &mut dyn QueryExecutor,
    ) -> Result<(), RecordError> {
        let token: Option<String> = record.get_as(&*storage, TagProperty::ReservedToken)?;
        if let Some(token) = token {
            storage.insert("RELEASED_TOKENS", &[("TOKEN", token.into())])?;
        }
        Ok(())
    }
}
