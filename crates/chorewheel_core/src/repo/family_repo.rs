//! Membership provider contract and SQLite family/member repository.
//!
//! # Responsibility
//! - Supply a family's members in rotation order.
//! - Provide the minimal family/member writes needed to seed a store.
//!
//! # Invariants
//! - Member listing order is `birth_date ASC, member_uuid ASC`.
//! - Leaving a family clears `family_uuid`; the member row is kept so past
//!   assignments still resolve.

use crate::model::family::{Family, FamilyId, Member, MemberId};
use crate::repo::codec::{date_to_db, parse_date, parse_uuid};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::schema::ensure_table_ready;
use rusqlite::{params, Connection, OptionalExtension, Row};

const MEMBER_SELECT_SQL: &str = "SELECT
    member_uuid,
    family_uuid,
    display_name,
    birth_date
FROM members";

/// Source of ordered family member lists.
pub trait MembershipProvider {
    /// Lists current members of `family_uuid`, oldest first.
    ///
    /// An unknown family yields an empty list.
    fn list_members_ordered_by_birth_date(&self, family_uuid: FamilyId)
        -> RepoResult<Vec<Member>>;
}

/// SQLite-backed family and member repository.
pub struct SqliteFamilyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFamilyRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "families", &["family_uuid", "name"])?;
        ensure_table_ready(
            conn,
            "members",
            &["member_uuid", "family_uuid", "display_name", "birth_date"],
        )?;
        Ok(Self { conn })
    }

    /// Inserts one family.
    pub fn create_family(&self, family: &Family) -> RepoResult<FamilyId> {
        self.conn.execute(
            "INSERT INTO families (family_uuid, name) VALUES (?1, ?2);",
            params![family.family_uuid.to_string(), family.name.as_str()],
        )?;
        Ok(family.family_uuid)
    }

    /// Loads one family by id.
    pub fn get_family(&self, family_uuid: FamilyId) -> RepoResult<Option<Family>> {
        let row = self
            .conn
            .query_row(
                "SELECT family_uuid, name FROM families WHERE family_uuid = ?1;",
                [family_uuid.to_string()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        match row {
            Some((id_text, name)) => Ok(Some(Family {
                family_uuid: parse_uuid(&id_text, "families.family_uuid")?,
                name,
            })),
            None => Ok(None),
        }
    }

    /// Inserts one member. A referenced family must exist.
    pub fn add_member(&self, member: &Member) -> RepoResult<MemberId> {
        if let Some(family_uuid) = member.family_uuid {
            self.ensure_family_exists(family_uuid)?;
        }

        self.conn.execute(
            "INSERT INTO members (member_uuid, family_uuid, display_name, birth_date)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                member.member_uuid.to_string(),
                member.family_uuid.map(|id| id.to_string()),
                member.display_name.as_str(),
                date_to_db(member.birth_date),
            ],
        )?;
        Ok(member.member_uuid)
    }

    /// Loads one member by id, regardless of family membership.
    pub fn get_member(&self, member_uuid: MemberId) -> RepoResult<Option<Member>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE member_uuid = ?1;"))?;
        let mut rows = stmt.query([member_uuid.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_member_row(row)?));
        }
        Ok(None)
    }

    /// Detaches one member from their family.
    pub fn remove_member_from_family(&self, member_uuid: MemberId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE members SET family_uuid = NULL WHERE member_uuid = ?1;",
            [member_uuid.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "member",
                id: member_uuid,
            });
        }
        Ok(())
    }

    fn ensure_family_exists(&self, family_uuid: FamilyId) -> RepoResult<()> {
        if self.get_family(family_uuid)?.is_none() {
            return Err(RepoError::NotFound {
                entity: "family",
                id: family_uuid,
            });
        }
        Ok(())
    }
}

impl MembershipProvider for SqliteFamilyRepository<'_> {
    fn list_members_ordered_by_birth_date(
        &self,
        family_uuid: FamilyId,
    ) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEMBER_SELECT_SQL}
             WHERE family_uuid = ?1
             ORDER BY birth_date ASC, member_uuid ASC;"
        ))?;
        let mut rows = stmt.query([family_uuid.to_string()])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let id_text: String = row.get("member_uuid")?;
    let family_text: Option<String> = row.get("family_uuid")?;
    let birth_text: String = row.get("birth_date")?;

    let family_uuid = match family_text {
        Some(value) => Some(parse_uuid(&value, "members.family_uuid")?),
        None => None,
    };

    Ok(Member {
        member_uuid: parse_uuid(&id_text, "members.member_uuid")?,
        display_name: row.get("display_name")?,
        birth_date: parse_date(&birth_text, "members.birth_date")?,
        family_uuid,
    })
}
