use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use tagedit_core::model::{DialogDescriptor, DialogId, EntityId, Slug, TagItem, TagRecord};
use tagedit_core::sanitize::{Sanitizer, TrimSanitizer};
use tagedit_core::validate::Schema;
use tagedit_core::{EditDialogController, Phase};

fn controller(name: &str) -> EditDialogController {
    let record = TagRecord {
        id: EntityId::new("t1"),
        name: Slug::new(name).expect("slug"),
        updated_at: Utc
            .with_ymd_and_hms(2026, 3, 1, 10, 0, 0)
            .single()
            .expect("timestamp"),
    };
    let descriptor = DialogDescriptor {
        id: DialogId::new("t1"),
        tag_id: EntityId::new("t1"),
    };
    EditDialogController::initialize(
        descriptor,
        Some(&TagItem::idle(record)),
        Schema::tag("Name cannot be empty"),
    )
}

fn blank() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![Just(' '), Just('\t'), Just('\n')], 0..8)
        .prop_map(|chars| chars.into_iter().collect())
}

#[derive(Debug, Clone)]
enum Op {
    Input(String),
    Submit,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => "[ a-z]{0,6}".prop_map(Op::Input),
        1 => Just(Op::Submit),
    ]
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn blank_names_never_submit(name in blank()) {
        let mut c = controller("draft");
        c.change_name(name);
        prop_assert!(!c.form().is_valid());
        prop_assert!(!c.can_submit());
        prop_assert!(c.submit(&TrimSanitizer::default()).is_none());
        prop_assert_eq!(c.form().name_error(), Some("Name cannot be empty"));
        prop_assert_eq!(c.phase(), Phase::Ready);
    }

    #[test]
    fn changed_names_are_submittable_and_trimmed(name in "[ ]{0,2}[a-zA-Z0-9][a-zA-Z0-9 -]{0,12}") {
        prop_assume!(name != "draft");
        let mut c = controller("draft");
        c.change_name(name.clone());
        prop_assert!(c.form().is_dirty());
        prop_assert!(c.can_submit());

        let intent = c.submit(&TrimSanitizer::default()).expect("intent");
        prop_assert_eq!(intent.form_data.name.current(), name.trim());
        prop_assert!(c.fields_disabled());
    }

    #[test]
    fn intents_only_follow_dirty_valid_forms(ops in prop::collection::vec(arb_op(), 1..20)) {
        let mut c = controller("draft");
        for op in ops {
            match op {
                Op::Input(value) => c.change_name(value),
                Op::Submit => {
                    let submittable = c.can_submit();
                    let emitted = c.submit(&TrimSanitizer::default()).is_some();
                    prop_assert_eq!(emitted, submittable);
                }
            }
        }
    }

    #[test]
    fn trim_sanitizer_is_idempotent(raw in "\\PC{0,24}", collapse in any::<bool>()) {
        let sanitizer = TrimSanitizer { collapse_whitespace: collapse };
        let once = sanitizer.sanitize(&raw);
        prop_assert_eq!(sanitizer.sanitize(&once), once.clone());
        prop_assert_eq!(once.trim(), once.as_str());
    }
}
