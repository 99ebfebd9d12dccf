use crate::core::{
    models::subject::{AcademicLevel, AcademicLevelWrite, Subject, SubjectQuery, SubjectWrite},
    ports::repository::{AcademicLevelCommon, Store, SubjectCommon},
    services::{found, require},
};
use crate::error::Error;

pub async fn levels<S>(store: &mut S) -> Result<Vec<AcademicLevel>, Error>
where
    S: Store,
{
    AcademicLevelCommon::query(store).await
}

pub async fn create_level<S>(store: &mut S, level: AcademicLevelWrite) -> Result<i32, Error>
where
    S: Store,
{
    let name = require(&level.name, "name", 128)?;
    AcademicLevelCommon::insert(store, AcademicLevelWrite { name }).await
}

pub async fn update_level<S>(store: &mut S, id: i32, level: AcademicLevelWrite) -> Result<u64, Error>
where
    S: Store,
{
    let name = require(&level.name, "name", 128)?;
    found(AcademicLevelCommon::update(store, id, AcademicLevelWrite { name }).await?, "academic level")
}

pub async fn delete_level<S>(store: &mut S, id: i32) -> Result<u64, Error>
where
    S: Store,
{
    found(AcademicLevelCommon::delete(store, id).await?, "academic level")
}

pub async fn subjects<S>(store: &mut S, query: SubjectQuery) -> Result<Vec<Subject>, Error>
where
    S: Store,
{
    SubjectCommon::query(store, &query).await
}

pub async fn create_subject<S>(store: &mut S, subject: SubjectWrite) -> Result<i32, Error>
where
    S: Store,
{
    let name = require(&subject.name, "name", 128)?;
    SubjectCommon::insert(
        store,
        SubjectWrite {
            name,
            academic_level_id: subject.academic_level_id,
        },
    )
    .await
}

pub async fn update_subject<S>(store: &mut S, id: i32, subject: SubjectWrite) -> Result<u64, Error>
where
    S: Store,
{
    let name = require(&subject.name, "name", 128)?;
    found(
        SubjectCommon::update(
            store,
            id,
            SubjectWrite {
                name,
                academic_level_id: subject.academic_level_id,
            },
        )
        .await?,
        "subject",
    )
}

pub async fn delete_subject<S>(store: &mut S, id: i32) -> Result<u64, Error>
where
    S: Store,
{
    found(SubjectCommon::delete(store, id).await?, "subject")
}
