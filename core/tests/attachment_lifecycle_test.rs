//! Attach / edit / detach flows through the manager against in-memory history

use pretty_assertions::assert_eq;
use std::sync::Arc;
use tw_core::{
	domain::{ActorRole, DataLifeBound, Timestamp, WindowError},
	infra::store::{HistoryStore, MemoryHistoryStore},
	ops::attachments::{
		AttachInput, AttachmentError, AttachmentManager, DetachInput, EditDataLifeInput,
		ErrorCategory, HistoryInput,
	},
};
use uuid::Uuid;

fn ts(raw: &str) -> Timestamp {
	Timestamp::parse(raw).unwrap()
}

fn manager() -> AttachmentManager {
	let store: Arc<dyn HistoryStore> = Arc::new(MemoryHistoryStore::new());
	AttachmentManager::new(store)
}

#[tokio::test]
async fn attach_defaults_data_life_to_attachment_start() {
	let manager = manager();
	let (d1, a1) = (Uuid::new_v4(), Uuid::new_v4());

	let attachment = manager
		.attach_device(d1, a1, ts("2024-01-01"), None)
		.await
		.unwrap();

	assert_eq!(attachment.attachment_start(), ts("2024-01-01"));
	assert_eq!(attachment.attachment_end(), None);
	assert_eq!(attachment.window.data_life_start(), ts("2024-01-01"));
	assert_eq!(attachment.window.data_life_end(), None);
	assert_eq!(attachment.version, 1);
}

#[tokio::test]
async fn non_admin_gets_one_free_data_life_start_edit() {
	let manager = manager();
	let attachment = manager
		.attach_device(Uuid::new_v4(), Uuid::new_v4(), ts("2024-01-01"), None)
		.await
		.unwrap();
	let id = attachment.assignment_id;

	let edited = manager
		.edit_data_life(id, ActorRole::User, Some(ts("2024-01-03")), None)
		.await
		.unwrap();
	assert_eq!(edited.window.data_life_start(), ts("2024-01-03"));
	assert!(edited.window.start_customized());

	let err = manager
		.edit_data_life(id, ActorRole::User, Some(ts("2024-01-05")), None)
		.await
		.unwrap_err();
	assert!(matches!(
		err,
		AttachmentError::PermissionDenied {
			bound: DataLifeBound::DataLifeStart,
			role: ActorRole::User,
		}
	));
	assert_eq!(err.category(), ErrorCategory::Authorization);

	// Admins may keep correcting
	let corrected = manager
		.edit_data_life(id, ActorRole::Admin, Some(ts("2024-01-05")), None)
		.await
		.unwrap();
	assert_eq!(corrected.window.data_life_start(), ts("2024-01-05"));
}

#[tokio::test]
async fn moving_start_back_does_not_restore_the_free_edit() {
	let manager = manager();
	let id = manager
		.attach_device(Uuid::new_v4(), Uuid::new_v4(), ts("2024-01-01"), None)
		.await
		.unwrap()
		.assignment_id;

	manager
		.edit_data_life(id, ActorRole::User, Some(ts("2024-01-03")), None)
		.await
		.unwrap();
	manager
		.edit_data_life(id, ActorRole::Admin, Some(ts("2024-01-01")), None)
		.await
		.unwrap();

	let err = manager
		.edit_data_life(id, ActorRole::User, Some(ts("2024-01-02")), None)
		.await
		.unwrap_err();
	assert!(matches!(err, AttachmentError::PermissionDenied { .. }));
}

#[tokio::test]
async fn detach_defaults_data_life_end_and_shows_in_history() {
	let manager = manager();
	let (d1, a1) = (Uuid::new_v4(), Uuid::new_v4());
	let id = manager
		.attach_device(d1, a1, ts("2024-01-01"), None)
		.await
		.unwrap()
		.assignment_id;
	manager
		.edit_data_life(id, ActorRole::User, Some(ts("2024-01-03")), None)
		.await
		.unwrap();

	let detached = manager
		.detach_device(id, ts("2024-06-01"), None)
		.await
		.unwrap();
	assert_eq!(detached.attachment_end(), Some(ts("2024-06-01")));
	assert_eq!(detached.window.data_life_end(), Some(ts("2024-06-01")));

	let timeline = manager
		.history()
		.timeline_for(&HistoryInput {
			device_id: Some(d1),
			animal_id: None,
		}
		.into())
		.await
		.unwrap();
	assert_eq!(timeline.len(), 1);

	let stored = &timeline[0];
	assert_eq!(stored.attachment_end(), Some(ts("2024-06-01")));
	assert_eq!(stored.window.data_life_start(), ts("2024-01-03"));
	assert!(stored.attachment_start() <= stored.window.data_life_start());
	assert!(stored.window.data_life_end() <= stored.attachment_end());
}

#[tokio::test]
async fn attaching_an_attached_device_fails() {
	let manager = manager();
	let d1 = Uuid::new_v4();
	manager
		.attach_device(d1, Uuid::new_v4(), ts("2024-01-01"), None)
		.await
		.unwrap();

	let err = manager
		.attach_device(d1, Uuid::new_v4(), ts("2024-03-01"), None)
		.await
		.unwrap_err();

	assert!(matches!(err, AttachmentError::DeviceAlreadyAttached { device_id } if device_id == d1));
	assert_eq!(err.category(), ErrorCategory::Conflict);
}

#[tokio::test]
async fn attach_inside_a_closed_deployment_overlaps() {
	let manager = manager();
	let d1 = Uuid::new_v4();
	let first = manager
		.attach_device(d1, Uuid::new_v4(), ts("2024-01-01"), None)
		.await
		.unwrap();
	manager
		.detach_device(first.assignment_id, ts("2024-06-01"), None)
		.await
		.unwrap();

	let err = manager
		.attach_device(d1, Uuid::new_v4(), ts("2024-03-01"), None)
		.await
		.unwrap_err();
	assert!(matches!(
		err,
		AttachmentError::OverlappingAttachment { conflicting, .. } if conflicting == first.assignment_id
	));

	// Half-open: re-deploying on the detach instant is fine
	let second = manager
		.attach_device(d1, Uuid::new_v4(), ts("2024-06-01"), None)
		.await
		.unwrap();

	let history = manager
		.history_for(HistoryInput {
			device_id: Some(d1),
			animal_id: None,
		})
		.await
		.unwrap();
	assert_eq!(
		history.iter().map(|a| a.assignment_id).collect::<Vec<_>>(),
		vec![first.assignment_id, second.assignment_id]
	);
}

#[tokio::test]
async fn animal_carries_one_open_collar() {
	let manager = manager();
	let a1 = Uuid::new_v4();
	manager
		.attach_device(Uuid::new_v4(), a1, ts("2024-01-01"), None)
		.await
		.unwrap();

	let err = manager
		.attach_device(Uuid::new_v4(), a1, ts("2024-02-01"), None)
		.await
		.unwrap_err();

	assert!(matches!(err, AttachmentError::AnimalAlreadyAttached { animal_id } if animal_id == a1));
}

#[tokio::test]
async fn data_life_end_cannot_be_edited_while_open() {
	let manager = manager();
	let id = manager
		.attach_device(Uuid::new_v4(), Uuid::new_v4(), ts("2024-01-01"), None)
		.await
		.unwrap()
		.assignment_id;

	for role in [ActorRole::User, ActorRole::Admin] {
		let err = manager
			.edit_data_life(id, role, None, Some(ts("2024-02-01")))
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			AttachmentError::Window(WindowError::OpenAttachment)
		));
	}
}

#[tokio::test]
async fn data_life_end_before_start_is_a_nesting_violation() {
	let manager = manager();
	let id = manager
		.attach_device(Uuid::new_v4(), Uuid::new_v4(), ts("2024-01-10"), None)
		.await
		.unwrap()
		.assignment_id;
	manager
		.detach_device(id, ts("2024-06-01"), None)
		.await
		.unwrap();

	let err = manager
		.edit_data_life(id, ActorRole::Admin, None, Some(ts("2024-01-05")))
		.await
		.unwrap_err();

	assert!(matches!(
		err,
		AttachmentError::Window(WindowError::NestingViolation {
			bound: DataLifeBound::DataLifeEnd,
			..
		})
	));
	assert_eq!(err.category(), ErrorCategory::InvariantViolation);

	// Nothing was persisted
	let stored = manager.history().timeline_for(&HistoryInput::default().into()).await.unwrap();
	assert_eq!(stored[0].window.data_life_end(), Some(ts("2024-06-01")));
	assert_eq!(stored[0].version, 2);
}

#[tokio::test]
async fn detach_rejects_bad_end_and_closed_records() {
	let manager = manager();
	let id = manager
		.attach_device(Uuid::new_v4(), Uuid::new_v4(), ts("2024-03-01"), None)
		.await
		.unwrap()
		.assignment_id;

	let err = manager
		.detach_device(id, ts("2024-02-01"), None)
		.await
		.unwrap_err();
	assert!(matches!(
		err,
		AttachmentError::Window(WindowError::InvalidInterval { .. })
	));
	assert_eq!(err.category(), ErrorCategory::MalformedInput);

	manager
		.detach_device(id, ts("2024-04-01"), None)
		.await
		.unwrap();

	let err = manager
		.detach_device(id, ts("2024-05-01"), None)
		.await
		.unwrap_err();
	assert!(matches!(err, AttachmentError::AttachmentNotOpen(closed) if closed == id));

	let missing = Uuid::new_v4();
	let err = manager
		.detach_device(missing, ts("2024-05-01"), None)
		.await
		.unwrap_err();
	assert!(matches!(err, AttachmentError::AttachmentNotFound(id) if id == missing));
}

#[tokio::test]
async fn detach_rejects_data_life_end_after_attachment_end() {
	let manager = manager();
	let id = manager
		.attach_device(Uuid::new_v4(), Uuid::new_v4(), ts("2024-01-01"), None)
		.await
		.unwrap()
		.assignment_id;

	let err = manager
		.detach_device(id, ts("2024-06-01"), Some(ts("2024-06-02")))
		.await
		.unwrap_err();

	assert!(matches!(
		err,
		AttachmentError::Window(WindowError::NestingViolation {
			bound: DataLifeBound::DataLifeEnd,
			..
		})
	));

	let stored = manager.history().timeline_for(&HistoryInput::default().into()).await.unwrap();
	assert!(stored[0].is_open());
	assert_eq!(stored[0].version, 1);
}

#[tokio::test]
async fn detach_rejects_data_life_end_before_data_life_start() {
	let manager = manager();
	let id = manager
		.attach_device(
			Uuid::new_v4(),
			Uuid::new_v4(),
			ts("2024-01-01"),
			Some(ts("2024-01-10")),
		)
		.await
		.unwrap()
		.assignment_id;

	let err = manager
		.detach_device(id, ts("2024-06-01"), Some(ts("2024-01-05")))
		.await
		.unwrap_err();

	assert!(matches!(
		err,
		AttachmentError::Window(WindowError::NestingViolation {
			bound: DataLifeBound::DataLifeEnd,
			..
		})
	));

	let stored = manager.history().timeline_for(&HistoryInput::default().into()).await.unwrap();
	assert!(stored[0].is_open());
	assert_eq!(stored[0].version, 1);
}

#[tokio::test]
async fn replayed_payloads_change_nothing() {
	let manager = manager();
	let (d1, a1) = (Uuid::new_v4(), Uuid::new_v4());

	let attached = manager
		.attach_device(d1, a1, ts("2024-01-01"), Some(ts("2024-01-02")))
		.await
		.unwrap();
	let replayed = manager
		.attach_device(d1, a1, ts("2024-01-01"), Some(ts("2024-01-02")))
		.await
		.unwrap();
	assert_eq!(replayed.assignment_id, attached.assignment_id);
	assert_eq!(replayed.version, attached.version);

	let id = attached.assignment_id;
	let same = manager
		.edit_data_life(id, ActorRole::User, Some(ts("2024-01-02")), None)
		.await
		.unwrap();
	assert_eq!(same.version, attached.version);

	let detached = manager
		.detach_device(id, ts("2024-06-01"), Some(ts("2024-05-20")))
		.await
		.unwrap();
	let again = manager
		.detach_device(id, ts("2024-06-01"), Some(ts("2024-05-20")))
		.await
		.unwrap();
	assert_eq!(again.version, detached.version);
	assert_eq!(again.window.data_life_end(), Some(ts("2024-05-20")));

	let history = manager.history_for(HistoryInput::default()).await.unwrap();
	assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn string_inputs_are_parsed_at_the_edge() {
	let manager = manager();
	let (device_id, animal_id) = (Uuid::new_v4(), Uuid::new_v4());

	let err = manager
		.attach(AttachInput {
			device_id,
			animal_id,
			attachment_start: "first of january".to_string(),
			data_life_start: None,
		})
		.await
		.unwrap_err();
	assert!(matches!(err, AttachmentError::MalformedTimestamp(_)));
	assert_eq!(err.category(), ErrorCategory::MalformedInput);

	let attached = manager
		.attach(AttachInput {
			device_id,
			animal_id,
			attachment_start: "2024-01-01T08:30Z".to_string(),
			data_life_start: None,
		})
		.await
		.unwrap();

	manager
		.detach(DetachInput {
			assignment_id: attached.assignment_id,
			attachment_end: "2024-02-01T12:00Z".to_string(),
			data_life_end: None,
		})
		.await
		.unwrap();

	let edited = manager
		.edit(EditDataLifeInput {
			assignment_id: attached.assignment_id,
			actor_role: ActorRole::User,
			data_life_start: Some("2024-01-02T00:00Z".to_string()),
			data_life_end: Some("2024-01-31T00:00Z".to_string()),
		})
		.await
		.unwrap();

	assert_eq!(edited.window.data_life_start(), ts("2024-01-02"));
	assert_eq!(edited.window.data_life_end(), Some(ts("2024-01-31")));
	assert_eq!(edited.attachment_start().to_string(), "2024-01-01T08:30Z");
}

#[tokio::test]
async fn history_filters_by_device_and_animal() {
	let manager = manager();
	let (d1, d2, a1, a2) = (
		Uuid::new_v4(),
		Uuid::new_v4(),
		Uuid::new_v4(),
		Uuid::new_v4(),
	);

	let first = manager
		.attach_device(d1, a1, ts("2024-01-01"), None)
		.await
		.unwrap();
	manager
		.detach_device(first.assignment_id, ts("2024-02-01"), None)
		.await
		.unwrap();
	manager
		.attach_device(d2, a1, ts("2024-02-01"), None)
		.await
		.unwrap();
	manager
		.attach_device(d1, a2, ts("2024-03-01"), None)
		.await
		.unwrap();

	let for_animal = manager
		.history_for(HistoryInput {
			device_id: None,
			animal_id: Some(a1),
		})
		.await
		.unwrap();
	assert_eq!(
		for_animal.iter().map(|a| a.device_id).collect::<Vec<_>>(),
		vec![d1, d2]
	);

	let both = manager
		.history_for(HistoryInput {
			device_id: Some(d1),
			animal_id: Some(a1),
		})
		.await
		.unwrap();
	assert_eq!(both.len(), 1);
	assert_eq!(both[0].assignment_id, first.assignment_id);

	let everything = manager.history_for(HistoryInput::default()).await.unwrap();
	assert_eq!(everything.len(), 3);
}

#[tokio::test]
async fn readings_attribute_to_the_covering_window() {
	let manager = manager();
	let d1 = Uuid::new_v4();

	let first = manager
		.attach_device(d1, Uuid::new_v4(), ts("2024-01-01"), Some(ts("2024-01-03")))
		.await
		.unwrap();
	manager
		.detach_device(first.assignment_id, ts("2024-02-01"), None)
		.await
		.unwrap();
	let second = manager
		.attach_device(d1, Uuid::new_v4(), ts("2024-02-01"), None)
		.await
		.unwrap();

	let history = manager.history();
	assert!(history
		.attribute_reading(d1, ts("2024-01-02"))
		.await
		.unwrap()
		.is_none());
	assert_eq!(
		history
			.attribute_reading(d1, ts("2024-01-15"))
			.await
			.unwrap()
			.map(|a| a.assignment_id),
		Some(first.assignment_id)
	);
	assert_eq!(
		history
			.attribute_reading(d1, ts("2024-02-01"))
			.await
			.unwrap()
			.map(|a| a.assignment_id),
		Some(second.assignment_id)
	);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_attaches_for_one_device_admit_one() {
	let manager = Arc::new(manager());
	let d1 = Uuid::new_v4();

	let attempts = (0..8)
		.map(|day| {
			let manager = manager.clone();
			tokio::spawn(async move {
				manager
					.attach_device(
						d1,
						Uuid::new_v4(),
						ts(&format!("2024-01-{:02}", day + 1)),
						None,
					)
					.await
			})
		})
		.collect::<Vec<_>>();

	let mut successes = 0;
	for attempt in attempts {
		match attempt.await.unwrap() {
			Ok(_) => successes += 1,
			Err(
				AttachmentError::DeviceAlreadyAttached { .. }
				| AttachmentError::OverlappingAttachment { .. },
			) => {}
			Err(e) => panic!("unexpected error: {e}"),
		}
	}

	assert_eq!(successes, 1);
	let history = manager.history_for(HistoryInput::default()).await.unwrap();
	assert_eq!(history.len(), 1);
}
