// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::fixtures::{chain, cid, conversation, fid, research_tree};
use crate::model::{FolderData, FolderId};
use crate::query::{can_reparent, is_descendant, ReparentRejection};

use super::{apply_ops, apply_ops_in_place, ApplyError, ContentOp, FolderOp, Op, SkipReason};

fn create(id: &str, name: &str, parent: Option<&str>) -> Op {
    Op::Folder(FolderOp::Create {
        folder_id: fid(id),
        name: name.to_owned(),
        parent_id: parent.map(fid),
    })
}

fn add(folder: &str, id: &str, title: &str) -> Op {
    Op::Content(ContentOp::Add {
        folder_id: fid(folder),
        conversation: conversation(id, title),
        source_folder_id: None,
    })
}

#[test]
fn create_registers_folder_and_empty_content_list() {
    let mut data = FolderData::new();
    let result = apply_ops(&mut data, &[create("research", "  Research  ", None)], 42)
        .expect("apply");

    assert_eq!(result.applied, 1);
    assert_eq!(result.delta.added_folders, vec![fid("research")]);
    let folder = data.folder(&fid("research")).expect("folder");
    assert_eq!(folder.name(), "Research");
    assert!(folder.is_expanded());
    assert!(!folder.pinned());
    assert_eq!(folder.created_at(), 42);
    assert_eq!(folder.updated_at(), 42);
    assert!(data.folder_contents().contains_key(&fid("research")));
}

#[test]
fn in_place_apply_matches_the_copying_one() {
    let ops = [
        create("fresh", "Fresh", Some("archive")),
        add("fresh", "conv-5", "Five"),
        add("fresh", "conv-5", "Five again"),
    ];
    let mut copied = research_tree();
    let expected = apply_ops(&mut copied, &ops, 7).expect("copying");

    let mut in_place = research_tree();
    let result = apply_ops_in_place(&mut in_place, &ops, 7).expect("in place");

    assert_eq!(result, expected);
    assert_eq!(in_place, copied);
    assert_eq!(result.skipped.len(), 1);
}

#[test]
fn create_with_blank_name_aborts_the_batch() {
    let mut data = research_tree();
    let before = data.clone();
    let err = apply_ops(
        &mut data,
        &[create("fresh", "Fresh", None), create("blank", "   ", None)],
        1,
    )
    .expect_err("blank name");

    assert_eq!(err, ApplyError::EmptyName);
    assert_eq!(data, before);
}

#[test]
fn create_rejects_existing_reserved_and_dangling_ids() {
    let mut data = research_tree();
    assert_eq!(
        apply_ops(&mut data, &[create("research", "Again", None)], 1),
        Err(ApplyError::AlreadyExists {
            folder_id: fid("research")
        })
    );
    assert_eq!(
        apply_ops(
            &mut data,
            &[Op::Folder(FolderOp::Create {
                folder_id: FolderId::root(),
                name: "Root".to_owned(),
                parent_id: None,
            })],
            1
        ),
        Err(ApplyError::ReservedId {
            folder_id: FolderId::root()
        })
    );
    assert_eq!(
        apply_ops(&mut data, &[create("orphan", "Orphan", Some("ghost"))], 1),
        Err(ApplyError::UnknownParent {
            parent_id: fid("ghost")
        })
    );
    assert_eq!(data, research_tree());
}

#[test]
fn rename_to_blank_is_a_silent_no_op() {
    let mut data = research_tree();
    let result = apply_ops(
        &mut data,
        &[Op::Folder(FolderOp::Rename {
            folder_id: fid("research"),
            name: " \t ".to_owned(),
        })],
        5,
    )
    .expect("apply");

    assert!(!result.changed());
    assert_eq!(result.skipped[0].reason, SkipReason::EmptyName);
    assert_eq!(data, research_tree());
}

#[test]
fn rename_updates_name_and_timestamp() {
    let mut data = research_tree();
    apply_ops(
        &mut data,
        &[Op::Folder(FolderOp::Rename {
            folder_id: fid("papers"),
            name: "Reading list".to_owned(),
        })],
        900,
    )
    .expect("apply");

    let folder = data.folder(&fid("papers")).expect("folder");
    assert_eq!(folder.name(), "Reading list");
    assert_eq!(folder.updated_at(), 900);
    assert_eq!(folder.created_at(), 200);
}

#[test]
fn toggles_flip_flags_and_bump_updated_at() {
    let mut data = research_tree();
    let result = apply_ops(
        &mut data,
        &[
            Op::Folder(FolderOp::TogglePin {
                folder_id: fid("archive"),
            }),
            Op::Folder(FolderOp::ToggleExpand {
                folder_id: fid("archive"),
            }),
        ],
        700,
    )
    .expect("apply");

    assert_eq!(result.delta.updated_folders, vec![fid("archive")]);
    let folder = data.folder(&fid("archive")).expect("folder");
    assert!(folder.pinned());
    assert!(!folder.is_expanded());
    assert_eq!(folder.updated_at(), 700);
}

#[test]
fn delete_cascades_to_descendants_and_their_contents() {
    let mut data = research_tree();
    let result = apply_ops(
        &mut data,
        &[Op::Folder(FolderOp::Delete {
            folder_id: fid("research"),
        })],
        1,
    )
    .expect("apply");

    assert_eq!(
        result.delta.removed_folders,
        vec![fid("papers"), fid("research")]
    );
    assert!(data.folder(&fid("research")).is_none());
    assert!(data.folder(&fid("papers")).is_none());
    assert!(!data.folder_contents().contains_key(&fid("papers")));
    assert!(!data.folder_contents().contains_key(&fid("research")));

    // Unrelated lists keep their entries, including the shared conv-123.
    assert_eq!(data.contents(&fid("archive")).len(), 2);
    assert_eq!(data.contents(&FolderId::root()).len(), 1);
    data.check_invariants().expect("invariants");
}

#[test]
fn delete_of_unknown_folder_is_skipped() {
    let mut data = research_tree();
    let result = apply_ops(
        &mut data,
        &[Op::Folder(FolderOp::Delete {
            folder_id: fid("ghost"),
        })],
        1,
    )
    .expect("apply");
    assert_eq!(result.skipped[0].reason, SkipReason::UnknownFolder);
    assert_eq!(data, research_tree());
}

#[test]
fn scenario_move_onto_own_child_is_rejected_without_error() {
    let mut data = FolderData::new();
    apply_ops(
        &mut data,
        &[
            create("research", "Research", None),
            create("papers", "Papers", Some("research")),
            add("papers", "conv-123", "Intro to X"),
        ],
        10,
    )
    .expect("apply");

    let papers = data.contents(&fid("papers"));
    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0].conversation_id(), &cid("conv-123"));
    assert_eq!(papers[0].title(), "Intro to X");

    let before = data.clone();
    let result = apply_ops(
        &mut data,
        &[Op::Folder(FolderOp::Move {
            folder_id: fid("research"),
            new_parent_id: Some(fid("papers")),
        })],
        11,
    )
    .expect("rejected move is not an error");

    assert!(!result.changed());
    let rejection = result.reparent_rejection().expect("rejection");
    assert!(matches!(
        rejection,
        ReparentRejection::OntoDescendant | ReparentRejection::HasSubfolders
    ));
    assert_eq!(data, before);
}

#[test]
fn move_leaf_folder_between_parents_and_to_root() {
    let mut data = research_tree();
    apply_ops(
        &mut data,
        &[Op::Folder(FolderOp::Move {
            folder_id: fid("papers"),
            new_parent_id: Some(fid("archive")),
        })],
        50,
    )
    .expect("apply");
    assert_eq!(
        data.folder(&fid("papers")).and_then(|f| f.parent_id()),
        Some(&fid("archive"))
    );

    apply_ops(
        &mut data,
        &[Op::Folder(FolderOp::Move {
            folder_id: fid("papers"),
            new_parent_id: None,
        })],
        60,
    )
    .expect("apply");
    let papers = data.folder(&fid("papers")).expect("folder");
    assert!(papers.is_root_level());
    assert_eq!(papers.updated_at(), 60);

    let result = apply_ops(
        &mut data,
        &[Op::Folder(FolderOp::Move {
            folder_id: fid("papers"),
            new_parent_id: None,
        })],
        70,
    )
    .expect("apply");
    assert_eq!(result.skipped[0].reason, SkipReason::Unchanged);
}

#[test]
fn gated_moves_never_create_cycles() {
    let mut data = chain(6);
    // Every folder tries to move under every other folder; only gated moves are issued.
    for mover in 0..6 {
        for target in 0..6 {
            let folder_id = fid(&format!("depth-{mover}"));
            let new_parent = fid(&format!("depth-{target}"));
            if !can_reparent(&data, &folder_id, Some(&new_parent)) {
                continue;
            }
            apply_ops(
                &mut data,
                &[Op::Folder(FolderOp::Move {
                    folder_id,
                    new_parent_id: Some(new_parent),
                })],
                1,
            )
            .expect("apply");
            data.check_invariants().expect("invariants");
        }
    }

    for folder in data.folders() {
        if let Some(parent_id) = folder.parent_id() {
            assert!(!is_descendant(&data, parent_id, folder.id()));
        }
    }
}

#[test]
fn ungated_moves_are_refused_by_apply_itself() {
    let mut data = chain(3);
    let result = apply_ops(
        &mut data,
        &[Op::Folder(FolderOp::Move {
            folder_id: fid("depth-2"),
            new_parent_id: Some(fid("depth-2")),
        })],
        1,
    )
    .expect("apply");
    assert_eq!(
        result.reparent_rejection(),
        Some(ReparentRejection::OntoSelf)
    );
    data.check_invariants().expect("invariants");
}

#[test]
fn adding_same_conversation_twice_keeps_one_entry() {
    let mut data = research_tree();
    let result = apply_ops(
        &mut data,
        &[
            add("archive", "conv-77", "New"),
            add("archive", "conv-77", "New again"),
        ],
        1,
    )
    .expect("apply");

    assert_eq!(result.applied, 1);
    assert_eq!(result.skipped[0].reason, SkipReason::AlreadyFiled);
    let matching: Vec<_> = data
        .contents(&fid("archive"))
        .iter()
        .filter(|c| c.conversation_id() == &cid("conv-77"))
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].title(), "New");
}

#[test]
fn add_with_source_moves_the_entry() {
    let mut data = research_tree();
    apply_ops(
        &mut data,
        &[Op::Content(ContentOp::Add {
            folder_id: fid("papers"),
            conversation: conversation("conv-9", "Old notes"),
            source_folder_id: Some(fid("archive")),
        })],
        1,
    )
    .expect("apply");

    assert!(data
        .contents(&fid("papers"))
        .iter()
        .any(|c| c.conversation_id() == &cid("conv-9")));
    assert!(!data
        .contents(&fid("archive"))
        .iter()
        .any(|c| c.conversation_id() == &cid("conv-9")));
}

#[test]
fn duplicate_add_with_source_leaves_source_untouched() {
    let mut data = research_tree();
    let result = apply_ops(
        &mut data,
        &[Op::Content(ContentOp::Add {
            folder_id: fid("papers"),
            conversation: conversation("conv-123", "Intro to X"),
            source_folder_id: Some(fid("archive")),
        })],
        1,
    )
    .expect("apply");

    assert!(!result.changed());
    assert_eq!(data, research_tree());
}

#[test]
fn add_into_unknown_folder_is_skipped() {
    let mut data = research_tree();
    let result = apply_ops(&mut data, &[add("ghost", "conv-5", "Five")], 1).expect("apply");
    assert_eq!(result.skipped[0].reason, SkipReason::UnknownFolder);
    assert!(!data.folder_contents().contains_key(&fid("ghost")));
}

#[test]
fn add_into_root_pseudo_folder() {
    let mut data = FolderData::new();
    apply_ops(
        &mut data,
        &[Op::Content(ContentOp::Add {
            folder_id: FolderId::root(),
            conversation: conversation("conv-5", "Five"),
            source_folder_id: None,
        })],
        1,
    )
    .expect("apply");
    assert_eq!(data.contents(&FolderId::root()).len(), 1);
}

#[test]
fn remove_absent_entry_is_not_an_error() {
    let mut data = research_tree();
    let result = apply_ops(
        &mut data,
        &[Op::Content(ContentOp::Remove {
            folder_id: fid("papers"),
            conversation_id: cid("conv-9"),
        })],
        1,
    )
    .expect("apply");
    assert_eq!(result.skipped[0].reason, SkipReason::NotFiled);
}

#[test]
fn remove_everywhere_matches_id_or_url_substring() {
    let mut data = research_tree();
    // A legacy record whose id differs from the one embedded in its url.
    data.contents_mut(&fid("research"))
        .push(crate::model::ConversationReference::new(
            cid("legacy-1"),
            "Legacy",
            "https://chat.deepseek.com/a/chat/s/conv-123",
            1,
        ));

    let result = apply_ops(
        &mut data,
        &[Op::Content(ContentOp::RemoveEverywhere {
            conversation_id: cid("conv-123"),
        })],
        1,
    )
    .expect("apply");

    assert_eq!(
        result.delta.touched_contents,
        vec![fid("archive"), fid("papers"), fid("research")]
    );
    assert!(data.contents(&fid("papers")).is_empty());
    assert_eq!(data.contents(&fid("archive")).len(), 1);
    assert_eq!(data.contents(&fid("research")).len(), 1);
}

#[test]
fn update_title_everywhere_only_reports_real_changes() {
    let mut data = research_tree();
    let op = Op::Content(ContentOp::UpdateTitleEverywhere {
        conversation_id: cid("conv-123"),
        title: "Intro to Y".to_owned(),
    });

    let first = apply_ops(&mut data, std::slice::from_ref(&op), 1).expect("apply");
    assert_eq!(
        first.delta.touched_contents,
        vec![fid("archive"), fid("papers")]
    );
    let second = apply_ops(&mut data, &[op], 2).expect("apply");
    assert!(!second.changed());
    assert_eq!(second.skipped[0].reason, SkipReason::Unchanged);
}

#[test]
fn rename_entry_overrides_one_title() {
    let mut data = research_tree();
    apply_ops(
        &mut data,
        &[Op::Content(ContentOp::RenameEntry {
            folder_id: fid("archive"),
            conversation_id: cid("conv-123"),
            title: " Custom ".to_owned(),
        })],
        1,
    )
    .expect("apply");

    assert_eq!(data.contents(&fid("archive"))[0].title(), "Custom");
    assert_eq!(data.contents(&fid("papers"))[0].title(), "Intro to X");
}

#[test]
fn menu_move_refreshes_added_at() {
    let mut data = research_tree();
    apply_ops(
        &mut data,
        &[Op::Content(ContentOp::Move {
            source_folder_id: fid("research"),
            target_folder_id: fid("archive"),
            conversation: conversation("conv-1", "Kickoff"),
        })],
        5_000,
    )
    .expect("apply");

    assert!(data.contents(&fid("research")).is_empty());
    let moved = data
        .contents(&fid("archive"))
        .iter()
        .find(|c| c.conversation_id() == &cid("conv-1"))
        .expect("moved entry");
    assert_eq!(moved.added_at(), 5_000);
}

#[test]
fn empty_batch_changes_nothing() {
    let mut data = research_tree();
    let result = apply_ops(&mut data, &[], 1).expect("apply");
    assert!(!result.changed());
    assert_eq!(result.applied, 0);
}
