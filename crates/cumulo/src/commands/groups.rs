//! Group and asset-tree command handlers.

use std::sync::Arc;

use tabled::Tabled;

use cumulo_core::{AssetTree, Command as CoreCommand, GId, Group, Platform};

use crate::cli::{GlobalOpts, GroupsArgs, GroupsCommand, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Children")]
    children: usize,
}

impl From<&Arc<Group>> for GroupRow {
    fn from(g: &Arc<Group>) -> Self {
        Self {
            id: g.id.to_string(),
            name: g.name.clone().unwrap_or_default(),
            kind: format!("{:?}", g.kind),
            children: g.child_asset_ids.len(),
        }
    }
}

/// ASCII rendering of the asset tree for table/plain output.
fn render_tree(tree: &AssetTree) -> String {
    fn walk(node: &cumulo_core::model::AssetNode, prefix: &str, last: bool, out: &mut String) {
        let branch = if last { "└─ " } else { "├─ " };
        let marker = match node.kind {
            cumulo_core::model::NodeKind::Group => "▸",
            cumulo_core::model::NodeKind::Device => "·",
        };
        out.push_str(&format!("{prefix}{branch}{marker} {} ({})\n", node.label, node.id));

        let child_prefix = format!("{prefix}{}", if last { "   " } else { "│  " });
        for (i, child) in node.children.iter().enumerate() {
            walk(child, &child_prefix, i + 1 == node.children.len(), out);
        }
    }

    let mut out = String::new();
    for (i, root) in tree.roots.iter().enumerate() {
        walk(root, "", i + 1 == tree.roots.len(), &mut out);
    }
    if !tree.orphan_device_ids.is_empty() {
        out.push_str(&format!(
            "({} unassigned devices)\n",
            tree.orphan_device_ids.len()
        ));
    }
    out.trim_end().to_owned()
}

pub async fn handle(
    platform: &Platform,
    args: GroupsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        GroupsCommand::List(_list) => {
            let snap = platform.groups_snapshot();
            let out =
                output::render_list(&global.output, &snap, |g| GroupRow::from(g), |g| g.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupsCommand::Tree => {
            let tree = platform.asset_tree();
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => render_tree(&tree),
                OutputFormat::Json => output::render_json_pretty(&tree),
                OutputFormat::JsonCompact => output::render_json_compact(&tree),
                OutputFormat::Yaml => output::render_yaml(&tree),
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupsCommand::Create { name, parent } => {
            let result = platform
                .execute(CoreCommand::CreateGroup {
                    name,
                    parent: parent.map(GId::new),
                })
                .await?;
            if let cumulo_core::CommandResult::Group(group) = result {
                if !global.quiet {
                    eprintln!("Created group {}", group.id);
                }
            }
            Ok(())
        }

        GroupsCommand::Assign { group, child } => {
            platform
                .execute(CoreCommand::AssignToGroup {
                    group_id: GId::new(group),
                    child_id: GId::new(child),
                })
                .await?;
            if !global.quiet {
                eprintln!("Assigned");
            }
            Ok(())
        }

        GroupsCommand::Unassign { group, child } => {
            platform
                .execute(CoreCommand::UnassignFromGroup {
                    group_id: GId::new(group),
                    child_id: GId::new(child),
                })
                .await?;
            if !global.quiet {
                eprintln!("Unassigned");
            }
            Ok(())
        }

        GroupsCommand::Delete { group } => {
            if !util::confirm(&format!("Delete group {group}?"), global.yes)? {
                return Ok(());
            }
            platform
                .execute(CoreCommand::DeleteGroup {
                    id: GId::new(group),
                })
                .await?;
            if !global.quiet {
                eprintln!("Group deleted");
            }
            Ok(())
        }
    }
}
