use tracing::debug;

use crate::registry::ProgramRegistry;
use crate::types::CpiNode;

/// Invocation depths beyond this are ignored
pub const MAX_CPI_DEPTH: usize = 64;

/// Program id and 0-based depth from a `Program <id> invoke [<n>]` line
pub fn parse_invoke(line: &str) -> Option<(&str, usize)> {
    invoke_candidates(line).find_map(|(program, rest)| {
        let digits = rest.strip_prefix(" [")?;
        let end = digits.find(']')?;
        let level: usize = digits[..end].parse().ok()?;
        level.checked_sub(1).map(|depth| (program, depth))
    })
}

/// Every program named in a `Program <id> invoke` line, at any depth
pub fn invoked_programs<'a>(logs: &'a [String]) -> impl Iterator<Item = &'a str> + 'a {
    logs.iter()
        .filter_map(|line| invoke_candidates(line).next().map(|(program, _)| program))
}

/// `(program, text after "invoke")` for each `Program <id> invoke` occurrence
fn invoke_candidates(line: &str) -> impl Iterator<Item = (&str, &str)> {
    line.match_indices("Program ").filter_map(move |(start, _)| {
        let tail = &line[start + "Program ".len()..];
        let end = tail.find(char::is_whitespace)?;
        let program = &tail[..end];
        if program.is_empty() {
            return None;
        }
        let rest = tail[end..].strip_prefix(" invoke")?;
        Some((program, rest))
    })
}

struct Frame {
    program_id: String,
    depth: usize,
    children: Vec<usize>,
}

/// Rebuild the cross-program invocation forest from execution logs.
///
/// A node at depth d hangs off whatever currently occupies stack slot d-1
/// and then takes slot d. Nodes with no open parent are dropped.
pub fn build_cpi_tree(logs: &[String], registry: &ProgramRegistry) -> Vec<CpiNode> {
    let mut arena: Vec<Frame> = Vec::new();
    let mut roots: Vec<usize> = Vec::new();
    let mut stack: Vec<Option<usize>> = Vec::new();

    for line in logs {
        let Some((program_id, depth)) = parse_invoke(line) else {
            continue;
        };
        if depth > MAX_CPI_DEPTH {
            debug!("Ignoring invoke at depth {} for {}", depth, program_id);
            continue;
        }

        let id = arena.len();
        arena.push(Frame {
            program_id: program_id.to_string(),
            depth,
            children: Vec::new(),
        });

        if depth == 0 {
            roots.push(id);
        } else {
            match stack.get(depth - 1).copied().flatten() {
                Some(parent) => arena[parent].children.push(id),
                None => debug!("Orphaned invoke of {} at depth {}", program_id, depth),
            }
        }

        // Deeper slots stay as they are
        if stack.len() <= depth {
            stack.resize(depth + 1, None);
        }
        stack[depth] = Some(id);
    }

    roots
        .into_iter()
        .map(|root| assemble(&arena, root, registry))
        .collect()
}

fn assemble(arena: &[Frame], id: usize, registry: &ProgramRegistry) -> CpiNode {
    let frame = &arena[id];
    CpiNode {
        program_id: frame.program_id.clone(),
        program_name: registry.name_of_str(&frame.program_id).to_string(),
        depth: frame.depth,
        children: frame
            .children
            .iter()
            .map(|&child| assemble(arena, child, registry))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JUPITER: &str = "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4";
    const TOKEN: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
    const SYSTEM: &str = "11111111111111111111111111111111";

    fn logs(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn test_parse_invoke() {
        assert_eq!(parse_invoke(&format!("Program {} invoke [1]", TOKEN)), Some((TOKEN, 0)));
        assert_eq!(parse_invoke(&format!("Program {} invoke [3]", TOKEN)), Some((TOKEN, 2)));
        assert_eq!(parse_invoke(&format!("Program {} success", TOKEN)), None);
        assert_eq!(parse_invoke("Program log: Instruction: Transfer"), None);
        assert_eq!(parse_invoke(&format!("Program {} invoke [x]", TOKEN)), None);
        assert_eq!(parse_invoke(&format!("Program {} invoke [0]", TOKEN)), None);
    }

    #[test]
    fn test_nested_tree() {
        let registry = ProgramRegistry::default();
        let logs = logs(&[
            &format!("Program {} invoke [1]", JUPITER),
            "Program log: Instruction: Route",
            &format!("Program {} invoke [2]", TOKEN),
            &format!("Program {} success", TOKEN),
            &format!("Program {} invoke [2]", SYSTEM),
            &format!("Program {} invoke [3]", TOKEN),
            &format!("Program {} success", JUPITER),
            &format!("Program {} invoke [1]", SYSTEM),
        ]);

        let forest = build_cpi_tree(&logs, &registry);
        assert_eq!(forest.len(), 2);

        let jupiter = &forest[0];
        assert_eq!(jupiter.program_name, "Jupiter v6");
        assert_eq!(jupiter.depth, 0);
        assert_eq!(jupiter.children.len(), 2);
        assert_eq!(jupiter.children[0].program_id, TOKEN);
        assert_eq!(jupiter.children[1].children[0].depth, 2);
        assert_eq!(jupiter.size(), 4);

        assert_eq!(forest[1].program_name, "System Program");
        assert!(forest[1].children.is_empty());
    }

    #[test]
    fn test_orphan_is_dropped() {
        let registry = ProgramRegistry::default();
        let logs = logs(&[
            &format!("Program {} invoke [2]", TOKEN),
            &format!("Program {} invoke [1]", JUPITER),
            &format!("Program {} invoke [3]", TOKEN),
            &format!("Program {} invoke [2]", SYSTEM),
        ]);

        let forest = build_cpi_tree(&logs, &registry);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].program_id, SYSTEM);
    }

    #[test]
    fn test_returning_to_shallower_depth_closes_frames() {
        let registry = ProgramRegistry::default();
        let logs = logs(&[
            &format!("Program {} invoke [1]", JUPITER),
            &format!("Program {} invoke [2]", SYSTEM),
            &format!("Program {} invoke [3]", TOKEN),
            &format!("Program {} invoke [2]", TOKEN),
            &format!("Program {} invoke [3]", SYSTEM),
        ]);

        let forest = build_cpi_tree(&logs, &registry);
        let root = &forest[0];
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].children.len(), 1);
        assert_eq!(root.children[1].children[0].program_id, SYSTEM);
    }

    #[test]
    fn test_deeper_slots_survive_a_shallower_invoke() {
        let registry = ProgramRegistry::default();
        let logs = logs(&[
            &format!("Program {} invoke [1]", JUPITER),
            &format!("Program {} invoke [2]", SYSTEM),
            &format!("Program {} invoke [3]", TOKEN),
            &format!("Program {} invoke [2]", SYSTEM),
            &format!("Program {} invoke [4]", JUPITER),
        ]);

        let forest = build_cpi_tree(&logs, &registry);
        assert_eq!(forest.len(), 1);
        let root = &forest[0];
        assert_eq!(root.children.len(), 2);
        assert!(root.children[1].children.is_empty());

        let token = &root.children[0].children[0];
        assert_eq!(token.program_id, TOKEN);
        assert_eq!(token.children.len(), 1);
        assert_eq!(token.children[0].program_id, JUPITER);
        assert_eq!(token.children[0].depth, 3);
    }

    #[test]
    fn test_unknown_program_name_and_deep_invokes() {
        let registry = ProgramRegistry::default();
        let mut lines = vec!["Program Mystery1111111111111111111111111111111 invoke [1]".to_string()];
        lines.push(format!("Program {} invoke [99]", TOKEN));

        let forest = build_cpi_tree(&lines, &registry);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].program_name, "Unknown Program");
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn test_no_invokes_yields_empty_forest() {
        let registry = ProgramRegistry::default();
        assert!(build_cpi_tree(&[], &registry).is_empty());
        assert!(build_cpi_tree(&logs(&["Program log: hi", "garbage ["]), &registry).is_empty());
    }

    #[test]
    fn test_invoked_programs_ignores_depth() {
        let logs = logs(&[
            &format!("Program {} invoke [1]", JUPITER),
            &format!("Program {} consumed 100 of 200000 compute units", JUPITER),
            &format!("Program {} invoke", TOKEN),
        ]);
        let programs: Vec<&str> = invoked_programs(&logs).collect();
        assert_eq!(programs, vec![JUPITER, TOKEN]);
    }
}
