use chorewheel_core::{
    Assignment, AssignmentHistoryStore, AssignmentStatus, FamilyId, Member, MembershipProvider,
    NewAssignment, RepoError, RepoResult, RotationConfig, RotationFailure, RotationService, Task,
    TaskId, TaskOutcome, TaskSource,
};
use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, 15).unwrap()
}

struct FixedTasks(RepoResult<Vec<Task>>);

impl TaskSource for FixedTasks {
    fn list_rotation_enabled_tasks(&self) -> RepoResult<Vec<Task>> {
        match &self.0 {
            Ok(tasks) => Ok(tasks.clone()),
            Err(err) => Err(RepoError::InvalidData(err.to_string())),
        }
    }
}

#[derive(Default)]
struct FixedMembers(HashMap<FamilyId, Vec<Member>>);

impl MembershipProvider for FixedMembers {
    fn list_members_ordered_by_birth_date(
        &self,
        family_uuid: FamilyId,
    ) -> RepoResult<Vec<Member>> {
        Ok(self.0.get(&family_uuid).cloned().unwrap_or_default())
    }
}

/// In-memory history with injectable faults.
#[derive(Default)]
struct ScriptedHistory {
    rows: RefCell<Vec<Assignment>>,
    reject_writes_for: HashSet<TaskId>,
    corrupt_reads_for: HashSet<TaskId>,
    /// Simulates another writer inserting first: the insert stores a row and
    /// then reports a uniqueness conflict.
    race_writes_for: HashSet<TaskId>,
}

impl ScriptedHistory {
    fn store(&self, new_assignment: &NewAssignment) -> Assignment {
        let assignment = Assignment {
            assignment_uuid: Uuid::new_v4(),
            task_uuid: new_assignment.task_uuid,
            member_uuid: new_assignment.member_uuid,
            scheduled_date: new_assignment.scheduled_date,
            status: AssignmentStatus::Pending,
            is_rollover: new_assignment.is_rollover,
            created_at: 0,
        };
        self.rows.borrow_mut().push(assignment.clone());
        assignment
    }
}

impl AssignmentHistoryStore for ScriptedHistory {
    fn latest_assignment(&self, task_uuid: TaskId) -> RepoResult<Option<Assignment>> {
        if self.corrupt_reads_for.contains(&task_uuid) {
            return Err(RepoError::InvalidData("invalid status `???`".to_string()));
        }
        Ok(self
            .rows
            .borrow()
            .iter()
            .filter(|row| row.task_uuid == task_uuid)
            .max_by_key(|row| row.scheduled_date)
            .cloned())
    }

    fn create_assignment(&self, new_assignment: &NewAssignment) -> RepoResult<Assignment> {
        if self.reject_writes_for.contains(&new_assignment.task_uuid) {
            return Err(RepoError::InvalidData("disk full".to_string()));
        }
        if self.race_writes_for.contains(&new_assignment.task_uuid) {
            self.store(new_assignment);
            return Err(RepoError::Duplicate("raced".to_string()));
        }
        Ok(self.store(new_assignment))
    }
}

fn household(count: usize) -> (FamilyId, Vec<Member>) {
    let family_uuid = Uuid::new_v4();
    let members = (0..count)
        .map(|index| {
            let birth = NaiveDate::from_ymd_opt(1970 + index as i32, 1, 1).unwrap();
            Member::new(format!("member-{index}"), birth, Some(family_uuid)).unwrap()
        })
        .collect();
    (family_uuid, members)
}

#[test]
fn write_failure_is_isolated_to_its_task() {
    let (family_uuid, members) = household(2);
    let broken = Task::new(family_uuid, "Broken").unwrap();
    let healthy = Task::new(family_uuid, "Healthy").unwrap();

    let history = ScriptedHistory {
        reject_writes_for: HashSet::from([broken.task_uuid]),
        ..ScriptedHistory::default()
    };
    let service = RotationService::new(
        FixedTasks(Ok(vec![broken.clone(), healthy.clone()])),
        FixedMembers(HashMap::from([(family_uuid, members.clone())])),
        history,
        RotationConfig::default(),
    );

    let report = service.run(today());
    assert!(matches!(
        report.outcome_for(broken.task_uuid),
        Some(TaskOutcome::Failed {
            failure: RotationFailure::Persistence(_)
        })
    ));
    match report.outcome_for(healthy.task_uuid) {
        Some(TaskOutcome::Assigned { assignment }) => {
            assert_eq!(assignment.member_uuid, members[0].member_uuid);
            assert_eq!(assignment.scheduled_date, today());
            assert_eq!(assignment.status, AssignmentStatus::Pending);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(report.outcomes[0].task_title, "Broken");
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.assigned_count(), 1);
}

#[test]
fn corrupt_history_is_reported_as_inconsistent() {
    let (family_uuid, members) = household(3);
    let task = Task::new(family_uuid, "Sweep").unwrap();
    let history = ScriptedHistory {
        corrupt_reads_for: HashSet::from([task.task_uuid]),
        ..ScriptedHistory::default()
    };
    let service = RotationService::new(
        FixedTasks(Ok(vec![task.clone()])),
        FixedMembers(HashMap::from([(family_uuid, members)])),
        history,
        RotationConfig::default(),
    );

    let report = service.run(today());
    assert!(matches!(
        report.outcome_for(task.task_uuid),
        Some(TaskOutcome::Failed {
            failure: RotationFailure::InconsistentHistory(_)
        })
    ));
}

#[test]
fn lost_insert_race_is_reported_as_already_assigned() {
    let (family_uuid, members) = household(2);
    let task = Task::new(family_uuid, "Mop").unwrap();
    let history = ScriptedHistory {
        race_writes_for: HashSet::from([task.task_uuid]),
        ..ScriptedHistory::default()
    };
    let service = RotationService::new(
        FixedTasks(Ok(vec![task.clone()])),
        FixedMembers(HashMap::from([(family_uuid, members)])),
        history,
        RotationConfig::default(),
    );

    let report = service.run(today());
    assert!(matches!(
        report.outcome_for(task.task_uuid),
        Some(TaskOutcome::AlreadyAssigned { .. })
    ));
    assert_eq!(report.failed_count(), 0);
}

#[test]
fn task_listing_failure_is_reported_not_raised() {
    let service = RotationService::new(
        FixedTasks(Err(RepoError::InvalidData("tasks unavailable".to_string()))),
        FixedMembers::default(),
        ScriptedHistory::default(),
        RotationConfig::default(),
    );

    let report = service.run(today());
    assert!(report.outcomes.is_empty());
    assert!(report
        .task_listing_error
        .as_deref()
        .is_some_and(|message| message.contains("tasks unavailable")));
    assert!(!report.is_clean());
}

#[test]
fn report_serializes_outcomes_with_status_tags() {
    let (family_uuid, _) = household(0);
    let task = Task::new(family_uuid, "Empty house").unwrap();
    let service = RotationService::new(
        FixedTasks(Ok(vec![task])),
        FixedMembers::default(),
        ScriptedHistory::default(),
        RotationConfig::default(),
    );

    let report = service.run(today());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["run_date"], "2024-08-15");
    assert_eq!(json["outcomes"][0]["outcome"]["status"], "skipped_no_members");
}
