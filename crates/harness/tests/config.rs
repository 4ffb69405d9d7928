use rowkeep_harness::fixtures::{PROFILE_PICTURES, SCHEMA_SQL, User, UserDraft, UserProperty};
use rowkeep_record::{Entity, Record, RecordConfig};

#[test]
fn file_backed_store_from_config() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let database = dir.path().join("rows.db");
    let media = dir.path().join("media");
    std::fs::create_dir_all(media.join(PROFILE_PICTURES))?;

    let path = dir.path().join("rowkeep.toml");
    std::fs::write(
        &path,
        format!(
            "database = {:?}\n\n[storage]\njournal_mode = \"wal\"\nbusy_timeout_ms = 250\n\n[images]\nroot = {:?}\n",
            database.display().to_string(),
            media.display().to_string(),
        ),
    )?;
    let config = RecordConfig::from_file(&path)?;

    let id = {
        let mut storage = config.open_storage()?;
        storage.execute_batch(SCHEMA_SQL)?;
        let mut user = User::create(
            &mut storage,
            UserDraft {
                picture: Some(".png".into()),
                ..UserDraft::new("ada")
            },
        )?;
        user.set(&mut storage, UserProperty::Nick, "Ada")?;
        user.id()
    };

    // a second connection sees the committed row
    let mut storage = config.open_storage()?;
    let mut user = Record::<User>::load(&storage, id)?;
    let nick: String = user.get_as(&storage, UserProperty::Nick)?;
    assert_eq!(nick, "Ada");

    let picture = media.join(PROFILE_PICTURES).join("ada0tok.png");
    std::fs::write(&picture, b"png")?;
    user.delete(&mut storage, &config.images)?;
    assert!(!picture.exists());

    Ok(())
}
