//! Character store.
//!
//! Every operation goes through a capability. [`OwnerScope`] is what a
//! logged-in user gets and only ever sees that user's characters.
//! [`AdminScope`] reaches every character and user and backs the admin
//! screens.

use model::entities::{
    character::{self, DEFAULT_STAT},
    user,
};
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{GameError, Result};
use crate::stats::{Action, ActionOutcome, Stat, Stats, apply_action};

/// Fields of a character about to be created
#[derive(Debug, Clone)]
pub struct NewCharacter {
    pub name: String,
    pub image: String,
}

/// Partial update of a character. `None` leaves a field alone; `Some(0)`
/// writes zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterPatch {
    pub name: Option<String>,
    pub image: Option<String>,
    pub health: Option<i32>,
    pub stamina: Option<i32>,
    pub energy: Option<i32>,
}

impl CharacterPatch {
    pub fn is_empty(&self) -> bool {
        *self == CharacterPatch::default()
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("health", self.health),
            ("stamina", self.stamina),
            ("energy", self.energy),
        ] {
            if let Some(value) = value {
                if value < 0 {
                    return Err(GameError::Validation(format!(
                        "{field} must not be negative, got {value}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Characters of one user, in the order they were created.
pub async fn characters_of(db: &DatabaseConnection, user_id: i32) -> Result<Vec<character::Model>> {
    let characters = character::Entity::find()
        .filter(character::Column::UserId.eq(user_id))
        .order_by_asc(character::Column::Id)
        .all(db)
        .await?;
    Ok(characters)
}

async fn save_patch(
    db: &DatabaseConnection,
    existing: character::Model,
    patch: CharacterPatch,
) -> Result<character::Model> {
    patch.validate()?;
    if patch.is_empty() {
        debug!("No fields to update for character ID: {}", existing.id);
        return Ok(existing);
    }

    let id = existing.id;
    let mut active: character::ActiveModel = existing.into();
    let mut updated_fields = Vec::new();

    if let Some(name) = patch.name {
        updated_fields.push(format!("name: {}", name));
        active.name = Set(name);
    }
    if let Some(image) = patch.image {
        updated_fields.push(format!("image: {}", image));
        active.image = Set(image);
    }
    if let Some(health) = patch.health {
        updated_fields.push(format!("health: {}", health));
        active.health = Set(health);
    }
    if let Some(stamina) = patch.stamina {
        updated_fields.push(format!("stamina: {}", stamina));
        active.stamina = Set(stamina);
    }
    if let Some(energy) = patch.energy {
        updated_fields.push(format!("energy: {}", energy));
        active.energy = Set(energy);
    }

    let updated = active.update(db).await?;
    info!(
        "Character with ID {} updated. Updated fields: {}",
        id,
        updated_fields.join(", ")
    );
    Ok(updated)
}

/// Capability over the characters of a single user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerScope {
    user_id: i32,
}

impl OwnerScope {
    pub fn new(user_id: i32) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> i32 {
        self.user_id
    }

    async fn find_owned(&self, db: &DatabaseConnection, id: i32) -> Result<character::Model> {
        character::Entity::find_by_id(id)
            .filter(character::Column::UserId.eq(self.user_id))
            .one(db)
            .await?
            .ok_or_else(|| {
                warn!("Character {} not found for user {}", id, self.user_id);
                GameError::character_not_found(id)
            })
    }

    /// Create a character with default stats and return the full list.
    #[instrument(skip(self, db), fields(user_id = self.user_id))]
    pub async fn create_character(
        &self,
        db: &DatabaseConnection,
        new: NewCharacter,
    ) -> Result<Vec<character::Model>> {
        trace!("Entering create_character function");

        if new.name.is_empty() || new.image.is_empty() {
            return Err(GameError::Validation(
                "name and image must not be empty".to_string(),
            ));
        }

        // The session may outlive its user
        user::Entity::find_by_id(self.user_id)
            .one(db)
            .await?
            .ok_or_else(|| GameError::user_not_found(self.user_id))?;

        let stats = Stats::default();
        let created = character::ActiveModel {
            user_id: Set(self.user_id),
            name: Set(new.name),
            image: Set(new.image),
            health: Set(stats.health),
            stamina: Set(stats.stamina),
            energy: Set(stats.energy),
            ..Default::default()
        }
        .insert(db)
        .await?;
        info!(
            "Character created with ID: {}, name: {}, stats {}/{}/{}",
            created.id, created.name, DEFAULT_STAT, DEFAULT_STAT, DEFAULT_STAT
        );

        characters_of(db, self.user_id).await
    }

    #[instrument(skip(self, db), fields(user_id = self.user_id))]
    pub async fn list_characters(&self, db: &DatabaseConnection) -> Result<Vec<character::Model>> {
        let characters = characters_of(db, self.user_id).await?;
        debug!("Retrieved {} characters", characters.len());
        Ok(characters)
    }

    #[instrument(skip(self, db), fields(user_id = self.user_id))]
    pub async fn get_character(&self, db: &DatabaseConnection, id: i32) -> Result<character::Model> {
        self.find_owned(db, id).await
    }

    #[instrument(skip(self, db), fields(user_id = self.user_id))]
    pub async fn update_character(
        &self,
        db: &DatabaseConnection,
        id: i32,
        patch: CharacterPatch,
    ) -> Result<character::Model> {
        trace!("Entering update_character function for character_id: {}", id);
        let existing = self.find_owned(db, id).await?;
        save_patch(db, existing, patch).await
    }

    #[instrument(skip(self, db), fields(user_id = self.user_id))]
    pub async fn delete_character(&self, db: &DatabaseConnection, id: i32) -> Result<()> {
        trace!("Entering delete_character function for character_id: {}", id);
        let existing = self.find_owned(db, id).await?;
        existing.delete(db).await?;
        info!("Character with ID {} deleted", id);
        Ok(())
    }

    /// Apply an action to one of this user's characters and persist the
    /// changed stat.
    #[instrument(skip(self, db, rng), fields(user_id = self.user_id))]
    pub async fn apply_action<R: Rng + Send>(
        &self,
        db: &DatabaseConnection,
        id: i32,
        action: Action,
        rng: &mut R,
    ) -> Result<(character::Model, ActionOutcome)> {
        trace!("Entering apply_action function for character_id: {}", id);
        let existing = self.find_owned(db, id).await?;

        let outcome = apply_action(Stats::from(&existing), action, rng);
        let value = outcome.stats.get(outcome.stat);

        let mut active: character::ActiveModel = existing.into();
        match outcome.stat {
            Stat::Health => active.health = Set(value),
            Stat::Stamina => active.stamina = Set(value),
            Stat::Energy => active.energy = Set(value),
        }
        let updated = active.update(db).await?;

        if outcome.fallen() {
            info!("Character {} has fallen", id);
        }
        Ok((updated, outcome))
    }
}

/// Elevated capability over every user and character.
///
/// Only the HTTP admin gate hands these out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminScope {
    _granted: (),
}

impl AdminScope {
    pub fn grant() -> Self {
        Self { _granted: () }
    }

    async fn find_any(&self, db: &DatabaseConnection, id: i32) -> Result<character::Model> {
        character::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| {
                warn!("Character {} not found", id);
                GameError::character_not_found(id)
            })
    }

    /// Every user with their characters, users and characters both in
    /// creation order.
    #[instrument(skip(self, db))]
    pub async fn list_users(
        &self,
        db: &DatabaseConnection,
    ) -> Result<Vec<(user::Model, Vec<character::Model>)>> {
        let users = user::Entity::find()
            .order_by_asc(user::Column::Id)
            .find_with_related(character::Entity)
            .order_by_asc(character::Column::Id)
            .all(db)
            .await?;
        debug!("Retrieved {} users", users.len());
        Ok(users)
    }

    #[instrument(skip(self, db))]
    pub async fn update_character(
        &self,
        db: &DatabaseConnection,
        id: i32,
        patch: CharacterPatch,
    ) -> Result<character::Model> {
        let existing = self.find_any(db, id).await?;
        debug!("Admin edit of character {} owned by user {}", id, existing.user_id);
        save_patch(db, existing, patch).await
    }

    #[instrument(skip(self, db))]
    pub async fn delete_character(&self, db: &DatabaseConnection, id: i32) -> Result<()> {
        let existing = self.find_any(db, id).await?;
        let owner = existing.user_id;
        existing.delete(db).await?;
        info!("Character with ID {} of user {} deleted by admin", id, owner);
        Ok(())
    }

    /// Delete a user. Their characters and sessions go with them.
    #[instrument(skip(self, db))]
    pub async fn delete_user(&self, db: &DatabaseConnection, user_id: i32) -> Result<()> {
        let result = user::Entity::delete_by_id(user_id).exec(db).await?;
        if result.rows_affected == 0 {
            warn!("User with ID {} not found for deletion", user_id);
            return Err(GameError::user_not_found(user_id));
        }
        info!("User with ID {} deleted", user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{insert_user, setup_db};
    use crate::stats::{FIGHT_LOSS_HEALTH, FIGHT_WIN_HEALTH};
    use model::entities::session;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::rngs::mock::StepRng;
    use sea_orm::PaginatorTrait;

    fn rex() -> NewCharacter {
        NewCharacter {
            name: "Rex".to_string(),
            image: "http://x/1.png".to_string(),
        }
    }

    async fn owner_with_rex(db: &DatabaseConnection, username: &str) -> (OwnerScope, character::Model) {
        let user = insert_user(db, username, "pw1").await;
        let scope = OwnerScope::new(user.id);
        let created = scope.create_character(db, rex()).await.unwrap();
        let rex = created.last().cloned().unwrap();
        (scope, rex)
    }

    #[tokio::test]
    async fn test_create_character_defaults() {
        let db = setup_db().await;
        let (scope, rex) = owner_with_rex(&db, "alice").await;

        assert_eq!((rex.health, rex.stamina, rex.energy), (50, 50, 50));
        assert_eq!(rex.name, "Rex");
        assert_eq!(rex.user_id, scope.user_id());
        assert_eq!(character::Entity::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_returns_list_in_insertion_order() {
        let db = setup_db().await;
        let (scope, _) = owner_with_rex(&db, "alice").await;

        let list = scope
            .create_character(
                &db,
                NewCharacter {
                    name: "Fido".to_string(),
                    image: "http://x/2.png".to_string(),
                },
            )
            .await
            .unwrap();

        let names: Vec<_> = list.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Rex", "Fido"]);
        assert_eq!(scope.list_characters(&db).await.unwrap(), list);
    }

    #[tokio::test]
    async fn test_create_character_validation() {
        let db = setup_db().await;
        let user = insert_user(&db, "alice", "pw1").await;
        let scope = OwnerScope::new(user.id);

        for (name, image) in [("", "http://x/1.png"), ("Rex", ""), ("", "")] {
            let result = scope
                .create_character(
                    &db,
                    NewCharacter {
                        name: name.to_string(),
                        image: image.to_string(),
                    },
                )
                .await;
            assert!(matches!(result, Err(GameError::Validation(_))));
        }
        assert!(scope.list_characters(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_character_for_deleted_user() {
        let db = setup_db().await;
        let scope = OwnerScope::new(4242);

        let result = scope.create_character(&db, rex()).await;
        assert!(matches!(result, Err(GameError::NotFound { resource: "User", .. })));
    }

    #[tokio::test]
    async fn test_characters_are_owner_scoped() {
        let db = setup_db().await;
        let (alice, alice_rex) = owner_with_rex(&db, "alice").await;
        let (bob, bob_rex) = owner_with_rex(&db, "bob").await;

        assert!(matches!(
            alice.get_character(&db, bob_rex.id).await,
            Err(GameError::NotFound { .. })
        ));
        assert!(matches!(
            bob.delete_character(&db, alice_rex.id).await,
            Err(GameError::NotFound { .. })
        ));
        assert!(matches!(
            bob.update_character(&db, alice_rex.id, CharacterPatch::default()).await,
            Err(GameError::NotFound { .. })
        ));

        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            alice.apply_action(&db, bob_rex.id, Action::Feed, &mut rng).await,
            Err(GameError::NotFound { .. })
        ));

        // Nothing of bob's was touched
        assert_eq!(bob.get_character(&db, bob_rex.id).await.unwrap(), bob_rex);
    }

    #[tokio::test]
    async fn test_delete_character() {
        let db = setup_db().await;
        let (scope, rex) = owner_with_rex(&db, "alice").await;

        scope.delete_character(&db, rex.id).await.unwrap();
        assert!(scope.list_characters(&db).await.unwrap().is_empty());

        let again = scope.delete_character(&db, rex.id).await;
        assert!(matches!(again, Err(GameError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_is_presence_based() {
        let db = setup_db().await;
        let (scope, rex) = owner_with_rex(&db, "alice").await;

        let updated = scope
            .update_character(
                &db,
                rex.id,
                CharacterPatch {
                    health: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.health, 0);
        assert_eq!((updated.stamina, updated.energy), (50, 50));
        assert_eq!(updated.name, "Rex");

        let renamed = scope
            .update_character(
                &db,
                rex.id,
                CharacterPatch {
                    name: Some("Max".to_string()),
                    energy: Some(7),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Max");
        assert_eq!(renamed.image, "http://x/1.png");
        assert_eq!((renamed.health, renamed.energy), (0, 7));
    }

    #[tokio::test]
    async fn test_empty_update_returns_character() {
        let db = setup_db().await;
        let (scope, rex) = owner_with_rex(&db, "alice").await;

        let patch = CharacterPatch::default();
        assert!(patch.is_empty());
        let same = scope.update_character(&db, rex.id, patch).await.unwrap();
        assert_eq!(same, rex);
    }

    #[tokio::test]
    async fn test_update_rejects_negative_stats() {
        let db = setup_db().await;
        let (scope, rex) = owner_with_rex(&db, "alice").await;

        let result = scope
            .update_character(
                &db,
                rex.id,
                CharacterPatch {
                    stamina: Some(-1),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(GameError::Validation(_))));
        assert_eq!(scope.get_character(&db, rex.id).await.unwrap().stamina, 50);
    }

    #[tokio::test]
    async fn test_feed_and_sleep_persist() {
        let db = setup_db().await;
        let (scope, rex) = owner_with_rex(&db, "alice").await;
        let mut rng = StdRng::seed_from_u64(3);

        let (fed, outcome) = scope.apply_action(&db, rex.id, Action::Feed, &mut rng).await.unwrap();
        assert_eq!((fed.health, fed.stamina, fed.energy), (50, 55, 50));
        assert_eq!(outcome.applied, 5);

        let (slept, _) = scope.apply_action(&db, rex.id, Action::Sleep, &mut rng).await.unwrap();
        assert_eq!((slept.health, slept.stamina, slept.energy), (50, 55, 55));

        assert_eq!(scope.get_character(&db, rex.id).await.unwrap(), slept);
    }

    #[tokio::test]
    async fn test_sleep_then_forty_fights() {
        let db = setup_db().await;
        let (scope, rex) = owner_with_rex(&db, "alice").await;
        let mut rng = StdRng::seed_from_u64(40);

        let (slept, _) = scope.apply_action(&db, rex.id, Action::Sleep, &mut rng).await.unwrap();
        assert_eq!(slept.energy, 55);

        let mut health = slept.health;
        for _ in 0..40 {
            let (fought, outcome) = scope
                .apply_action(&db, rex.id, Action::Fight, &mut rng)
                .await
                .unwrap();
            assert!(outcome.rolled == FIGHT_WIN_HEALTH || outcome.rolled == FIGHT_LOSS_HEALTH);
            assert_eq!(fought.health, (health + outcome.rolled).max(0));
            assert!((0..=50 + 3 * 40).contains(&fought.health));
            assert_eq!((fought.stamina, fought.energy), (50, 55));
            health = fought.health;
        }
    }

    #[tokio::test]
    async fn test_fallen_character_is_kept() {
        let db = setup_db().await;
        let (scope, rex) = owner_with_rex(&db, "alice").await;
        let one_hp = CharacterPatch {
            health: Some(1),
            ..Default::default()
        };
        scope.update_character(&db, rex.id, one_hp).await.unwrap();

        // StepRng(u64::MAX) loses every fight, StepRng(0) wins every fight
        let mut losing = StepRng::new(u64::MAX, 0);
        let (fallen, outcome) = scope
            .apply_action(&db, rex.id, Action::Fight, &mut losing)
            .await
            .unwrap();
        assert_eq!(fallen.health, 0);
        assert!(outcome.fallen());

        let (still_down, _) = scope
            .apply_action(&db, rex.id, Action::Fight, &mut losing)
            .await
            .unwrap();
        assert_eq!(still_down.health, 0);

        assert_eq!(scope.list_characters(&db).await.unwrap().len(), 1);
        let (fed, _) = scope
            .apply_action(&db, rex.id, Action::Feed, &mut losing)
            .await
            .unwrap();
        assert_eq!(fed.stamina, 55);

        let mut winning = StepRng::new(0, 0);
        let (revived, outcome) = scope
            .apply_action(&db, rex.id, Action::Fight, &mut winning)
            .await
            .unwrap();
        assert_eq!(revived.health, 3);
        assert!(!outcome.fallen());
    }

    #[tokio::test]
    async fn test_admin_reaches_any_character() {
        let db = setup_db().await;
        let (alice, alice_rex) = owner_with_rex(&db, "alice").await;
        let admin = AdminScope::grant();

        let updated = admin
            .update_character(
                &db,
                alice_rex.id,
                CharacterPatch {
                    stamina: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.stamina, 0);

        admin.delete_character(&db, alice_rex.id).await.unwrap();
        assert!(alice.list_characters(&db).await.unwrap().is_empty());

        assert!(matches!(
            admin.delete_character(&db, alice_rex.id).await,
            Err(GameError::NotFound { .. })
        ));
        assert!(matches!(
            admin.update_character(&db, 999, CharacterPatch::default()).await,
            Err(GameError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_admin_list_and_delete_users() {
        let db = setup_db().await;
        let (alice, _) = owner_with_rex(&db, "alice").await;
        insert_user(&db, "bob", "pw2").await;
        crate::sessions::open_session(
            &db,
            &user::Entity::find_by_id(alice.user_id()).one(&db).await.unwrap().unwrap(),
            crate::sessions::default_session_ttl(),
        )
        .await
        .unwrap();
        let admin = AdminScope::grant();

        let users = admin.list_users(&db).await.unwrap();
        let summary: Vec<_> = users
            .iter()
            .map(|(user, characters)| (user.username.as_str(), characters.len()))
            .collect();
        assert_eq!(summary, vec![("alice", 1), ("bob", 0)]);

        admin.delete_user(&db, alice.user_id()).await.unwrap();
        assert_eq!(character::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(session::Entity::find().count(&db).await.unwrap(), 0);

        assert!(matches!(
            admin.delete_user(&db, alice.user_id()).await,
            Err(GameError::NotFound { resource: "User", .. })
        ));
    }
}
