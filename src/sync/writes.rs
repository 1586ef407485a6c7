use log::{info, warn};

use crate::api::{ApiError, Resource};
use crate::entities::{Attributes, Entity, EntityId};
use crate::store::{SliceAction, StoreError};
use crate::sync::{SyncError, SyncService};

impl SyncService {
    /// Creates an entity on the backend, then stores the persisted record.
    ///
    /// Validation runs first and a failure never reaches the backend or the
    /// store. Links the response does not echo back are kept from `entity`.
    ///
    /// # Returns
    /// The backend-assigned ID
    pub async fn create<A: Attributes>(&self, entity: Entity<A>) -> Result<EntityId, SyncError> {
        entity.attributes.validate()?;
        let resource = Resource::from_entity(&entity)?;
        let created = self.backend.create(A::KIND, resource).await?;

        let mut store = self.store.lock().await;
        let persisted = with_local_links(store.state().slice::<A>().entity_from_resource(&created)?, &entity);
        let id = persisted.id.clone();
        store.dispatch(SliceAction::Upsert(persisted))?;
        info!("✅ Created {} '{id}'", A::KIND);
        Ok(id)
    }

    /// Creates an entity, showing it in the store before the backend answers.
    ///
    /// The entity is stored under a provisional ID right away. On success the
    /// provisional ID is swapped for the backend's in place; on failure the
    /// entity is removed again and the error returned.
    ///
    /// If a fetch dropped the provisional entity meanwhile, the persisted one
    /// is stored anyway. After a logout it is not.
    pub async fn create_optimistic<A: Attributes>(&self, entity: Entity<A>) -> Result<EntityId, SyncError> {
        entity.attributes.validate()?;
        let provisional = EntityId::provisional();
        let mut draft = entity;
        draft.id = provisional.clone();
        let resource = Resource::from_entity(&draft)?;

        let generation = {
            let mut store = self.store.lock().await;
            store.dispatch(SliceAction::Upsert(draft.clone()))?;
            store.state().generation(A::KIND)
        };

        let created = self.backend.create(A::KIND, resource).await;

        let mut store = self.store.lock().await;
        let persisted = created.and_then(|created| store.state().slice::<A>().entity_from_resource(&created));
        let persisted = match persisted {
            Ok(persisted) => with_local_links(persisted, &draft),
            Err(e) => {
                warn!("⚠️  Rolling back {} '{provisional}': {e}", A::KIND);
                store.dispatch(SliceAction::<A>::Remove(provisional))?;
                return Err(e.into());
            }
        };

        let id = persisted.id.clone();
        match store.dispatch(SliceAction::Commit {
            provisional: provisional.clone(),
            entity: persisted.clone(),
        }) {
            Ok(()) => info!("✅ Created {} '{id}' (was '{provisional}')", A::KIND),
            Err(StoreError::NotFound { .. }) if store.state().generation(A::KIND) == generation => {
                // A fetch replaced the slice while the request was out.
                warn!("⚠️  {} '{provisional}' was replaced by a fetch, storing '{id}'", A::KIND);
                store.dispatch(SliceAction::Upsert(persisted))?;
            }
            Err(StoreError::NotFound { .. }) => {
                warn!("⚠️  {} '{provisional}' was cleared before the backend answered", A::KIND);
            }
            Err(StoreError::DuplicateId(_)) => {
                warn!("⚠️  {} '{id}' is already stored, dropping '{provisional}'", A::KIND);
                store.dispatch(SliceAction::<A>::Remove(provisional))?;
                store.dispatch(SliceAction::Upsert(persisted))?;
            }
        }
        Ok(id)
    }

    /// Replaces the attributes of a stored entity, keeping its links.
    pub async fn update<A: Attributes>(&self, id: &EntityId, attributes: A) -> Result<(), SyncError> {
        let mut entity = self.read(|state| state.require::<A>(id).cloned()).await?;
        entity.attributes = attributes;
        self.update_entity(entity).await
    }

    /// Sends a modified entity (attributes and links) and stores the result.
    pub async fn update_entity<A: Attributes>(&self, entity: Entity<A>) -> Result<(), SyncError> {
        self.read(|state| state.require::<A>(&entity.id).map(|_| ())).await?;
        entity.attributes.validate()?;
        let resource = Resource::from_entity(&entity)?;
        let updated = self.backend.update(A::KIND, &entity.id, resource).await?;

        let mut store = self.store.lock().await;
        let persisted = with_local_links(store.state().slice::<A>().entity_from_resource(&updated)?, &entity);
        store.dispatch(SliceAction::Upsert(persisted))?;
        info!("✅ Updated {} '{}'", A::KIND, entity.id);
        Ok(())
    }

    /// Deletes an entity on the backend, then removes it and every reference
    /// to it from the store. A backend 404 counts as already deleted.
    pub async fn delete<A: Attributes>(&self, id: &EntityId) -> Result<(), SyncError> {
        self.read(|state| state.require::<A>(id).map(|_| ())).await?;

        match self.backend.delete(A::KIND, id).await {
            Ok(()) => {}
            Err(ApiError::NotFound(url)) => warn!("⚠️  {} '{id}' already gone on the backend ({url})", A::KIND),
            Err(e) => return Err(e.into()),
        }

        self.store.lock().await.dispatch(SliceAction::<A>::Remove(id.clone()))?;
        info!("✅ Deleted {} '{id}'", A::KIND);
        Ok(())
    }
}

fn with_local_links<A>(mut persisted: Entity<A>, local: &Entity<A>) -> Entity<A> {
    for (name, link) in &local.relationships {
        persisted.relationships.entry(*name).or_insert_with(|| link.clone());
    }
    persisted
}
