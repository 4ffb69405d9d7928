use std::cell::Cell;

use rowkeep_core::{ColumnValue, RecordId};
use rowkeep_harness::TestStore;
use rowkeep_harness::fixtures::{
    CHARACTER_IMAGES, Character, CharacterDraft, CharacterImageDraft, CharacterProperty,
    PROFILE_PICTURES, Tag, TagDraft, TagProperty, User, UserDraft, UserProperty,
};
use rowkeep_record::{
    Attachments, Entity, HasImage, HasImageSet, Image, ImageStore, Record, RecordError,
    properties,
};
use rowkeep_storage::{Equals, QueryExecutor};

// ============================================================================
// Tombstones
// ============================================================================

#[test]
fn delete_applies_tombstone_values() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new()?;
    let mut user = store.create::<User>(UserDraft {
        email: Some("ada@example.org".into()),
        color: Some("112233".into()),
        ..UserDraft::new("ada")
    })?;

    store.delete(&mut user)?;

    let rows = store.db.select(
        "USERS",
        &["EMAIL", "NICK", "PICTURE_LOC", "PICTURE_NSFW", "COLOR", "DELETED", "USERNAME"],
        &Equals::id(user.id()),
    )?;
    assert_eq!(rows.len(), 1, "soft delete keeps the row");
    let row = &rows[0];
    for (column, value) in User::deleted_values() {
        assert_eq!(row.get(column), Some(value), "{column}");
    }
    // columns outside the tombstone keep their values
    assert_eq!(row.get("USERNAME"), Some(&ColumnValue::Text("ada".into())));

    Ok(())
}

#[test]
fn reads_after_delete_reflect_tombstone() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new()?;
    let mut user = store.create_user("ada")?;

    let nick: String = user.get_as(&store.db, UserProperty::Nick)?;
    assert_eq!(nick, "ada");
    assert!(!user.is(&store.db, UserProperty::Deleted)?);

    store.delete(&mut user)?;

    let nick: String = user.get_as(&store.db, UserProperty::Nick)?;
    assert_eq!(nick, "Deleted user");
    assert!(user.is(&store.db, UserProperty::Deleted)?);
    assert_eq!(user.get(&store.db, UserProperty::Email)?, ColumnValue::Null);

    // a deleted row still exists
    assert!(Record::<User>::exists(&store.db, user.id())?);

    Ok(())
}

#[test]
fn delete_of_vanished_row_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new()?;
    let mut tag = store.create::<Tag>(TagDraft {
        label: "sketch".into(),
        reserved_token: None,
    })?;

    store.db.inner().execute_batch("DELETE FROM TAGS;")?;

    let err = store.delete(&mut tag).unwrap_err();
    assert!(err.is_not_found(), "{err}");

    Ok(())
}

// ============================================================================
// Hooks
// ============================================================================

#[test]
fn before_delete_runs_before_tombstone() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new()?;
    let mut tag = store.create::<Tag>(TagDraft {
        label: "  landscape ".into(),
        reserved_token: Some("landscape-01".into()),
    })?;

    store.delete(&mut tag)?;

    assert_eq!(
        store
            .db
            .count("RELEASED_TOKENS", &Equals::new("TOKEN", "landscape-01"))?,
        1
    );
    assert_eq!(tag.get(&store.db, TagProperty::ReservedToken)?, ColumnValue::Null);
    assert!(tag.is(&store.db, TagProperty::Deleted)?);

    Ok(())
}

#[test]
fn before_delete_without_token_releases_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new()?;
    let mut tag = store.create::<Tag>(TagDraft {
        label: "wip".into(),
        reserved_token: None,
    })?;

    store.delete(&mut tag)?;

    let released: i64 = store.db.inner().conn().query_row(
        "SELECT COUNT(*) FROM RELEASED_TOKENS",
        [],
        |row| row.get(0),
    )?;
    assert_eq!(released, 0);

    Ok(())
}

// ============================================================================
// Image cascade
// ============================================================================

#[test]
fn delete_removes_profile_picture() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new()?;
    let mut user = store.create::<User>(UserDraft {
        picture: Some("-avatar.png".into()),
        ..UserDraft::new("ada")
    })?;
    let picture = store.place_image(PROFILE_PICTURES, "ada0tok-avatar.png")?;
    let unrelated = store.place_image(PROFILE_PICTURES, "bob0tok-avatar.png")?;

    store.delete(&mut user)?;

    assert!(!picture.exists());
    assert!(unrelated.exists());

    Ok(())
}

#[test]
fn default_picture_survives_delete() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new()?;
    let mut user = store.create_user("ada")?;
    let shared = store.place_image(PROFILE_PICTURES, "default.png")?;

    store.delete(&mut user)?;

    assert!(shared.exists());

    Ok(())
}

#[test]
fn missing_picture_file_does_not_block_delete() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new()?;
    let mut user = store.create::<User>(UserDraft {
        picture: Some(".png".into()),
        ..UserDraft::new("ada")
    })?;

    store.delete(&mut user)?;
    assert!(user.is(&store.db, UserProperty::Deleted)?);

    Ok(())
}

#[test]
fn unresolvable_image_does_not_block_tombstone() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new()?;
    let mut user = store.create::<User>(UserDraft {
        picture: Some("-a.png".into()),
        ..UserDraft::new("ada")
    })?;
    let picture = store.place_image(PROFILE_PICTURES, "ada0tok-a.png")?;

    // a blob token cannot be read as text, so the image cannot be resolved
    store
        .db
        .inner()
        .execute_batch("UPDATE USERS SET FILE_TOKEN = X'00';")?;
    assert!(user.get_as::<String>(&store.db, UserProperty::FileToken).is_err());

    store.delete(&mut user)?;

    assert!(user.is(&store.db, UserProperty::Deleted)?);
    let nick: String = user.get_as(&store.db, UserProperty::Nick)?;
    assert_eq!(nick, "Deleted user");
    assert!(picture.exists());

    Ok(())
}

#[test]
fn delete_removes_every_gallery_image() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new()?;
    let owner = store.create_user("ada")?.id();
    let mut character = store.create::<Character>(CharacterDraft {
        owner,
        token: "c7f3".into(),
        name: "Wren".into(),
        description: "A courier".into(),
        color: None,
        public: true,
        images: (1..=3)
            .map(|n| CharacterImageDraft {
                path: format!("-{n}.png"),
                caption: format!("pose {n}"),
                nsfw: n == 3,
            })
            .collect(),
    })?;

    let files = (1..=3)
        .map(|n| store.place_image(CHARACTER_IMAGES, &format!("c7f3-{n}.png")))
        .collect::<Result<Vec<_>, _>>()?;
    let other = store.place_image(CHARACTER_IMAGES, "d001-1.png")?;

    store.delete(&mut character)?;

    for file in &files {
        assert!(!file.exists(), "{}", file.display());
    }
    assert!(other.exists());
    assert_eq!(
        character.get(&store.db, CharacterProperty::Name)?,
        ColumnValue::Text("Deleted character".into())
    );
    assert!(!character.is(&store.db, CharacterProperty::Public)?);

    Ok(())
}

// ============================================================================
// Delete-call counting
// ============================================================================

thread_local! {
    static IMAGE_DELETES: Cell<usize> = const { Cell::new(0) };
}

struct CountedImage;

impl Image for CountedImage {
    fn delete(&self, _store: &ImageStore) -> Result<(), RecordError> {
        IMAGE_DELETES.with(|n| n.set(n.get() + 1));
        Ok(())
    }
}

/// Draws on the CHARACTERS table with one cover image plus one image per
/// CHARACTER_IMAGES row, and leaves the row untouched on delete.
struct Album;

properties! {
    enum AlbumProperty {
        Name => "NAME";
    }
}

impl Entity for Album {
    const TABLE: &'static str = "CHARACTERS";
    type Property = AlbumProperty;
    type Draft = RecordId;

    fn deleted_values() -> &'static [(&'static str, ColumnValue)] {
        &[]
    }

    fn create(storage: &mut dyn QueryExecutor, owner: RecordId) -> Result<Record<Self>, RecordError> {
        Record::insert(
            storage,
            &[
                ("USER_ID", owner.get().into()),
                ("CHARACTER_TOKEN", "album".into()),
                ("NAME", "Album".into()),
            ],
        )
    }

    fn attachments() -> Attachments<Self> {
        Attachments::none().with_image().with_image_set()
    }
}

impl HasImage for Album {
    fn image(
        _record: &mut Record<Self>,
        _storage: &dyn QueryExecutor,
    ) -> Result<Box<dyn Image>, RecordError> {
        Ok(Box::new(CountedImage))
    }
}

impl HasImageSet for Album {
    fn image_set(
        record: &mut Record<Self>,
        storage: &dyn QueryExecutor,
    ) -> Result<Vec<Box<dyn Image>>, RecordError> {
        let rows = storage.count("CHARACTER_IMAGES", &Equals::new("CHARACTER_ID", record.id().get()))?;
        Ok((0..rows).map(|_| Box::new(CountedImage) as Box<dyn Image>).collect())
    }
}

fn add_album_images(store: &mut TestStore, album: RecordId, n: usize) -> Result<(), RecordError> {
    for i in 0..n {
        store.db.insert(
            "CHARACTER_IMAGES",
            &[
                ("CHARACTER_ID", album.get().into()),
                ("PATH", format!("-{i}.png").into()),
            ],
        )?;
    }
    Ok(())
}

#[test]
fn each_attached_image_is_deleted_exactly_once() -> Result<(), Box<dyn std::error::Error>> {
    for n in [0, 1, 4] {
        let mut store = TestStore::new()?;
        let owner = store.create_user("ada")?.id();
        let mut album = store.create::<Album>(owner)?;
        add_album_images(&mut store, album.id(), n)?;

        IMAGE_DELETES.with(|c| c.set(0));
        store.delete(&mut album)?;
        assert_eq!(IMAGE_DELETES.with(Cell::get), n + 1, "{n} gallery images");
    }

    Ok(())
}

#[test]
fn empty_tombstone_skips_the_update() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new()?;
    let owner = store.create_user("ada")?.id();
    let mut album = store.create::<Album>(owner)?;
    store.db.reset_counts();

    store.delete(&mut album)?;

    assert_eq!(store.db.counts().updates, 0);
    let name: String = album.get_as(&store.db, AlbumProperty::Name)?;
    assert_eq!(name, "Album");

    Ok(())
}

#[test]
fn attachments_report_registered_capabilities() {
    assert!(User::attachments().has_image());
    assert!(!User::attachments().has_image_set());
    assert!(Character::attachments().has_image_set());
    assert!(!Tag::attachments().has_image());
    assert!(!Tag::attachments().has_image_set());
}
