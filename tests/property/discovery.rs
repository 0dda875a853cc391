use std::collections::HashSet;

use proptest::prelude::*;

use batchfleet::network::NetworkGraph;
use batchfleet_test_utils::FakeSubstrate;

proptest! {
    #[test]
    fn discover_visits_every_reachable_node_once(
        edges in proptest::collection::vec((0usize..15, 0usize..15), 0..40),
    ) {
        let mut substrate = FakeSubstrate::new().link("n0", "n1");
        for (a, b) in edges.iter().copied().filter(|(a, b)| a != b) {
            substrate = substrate.link(&format!("n{a}"), &format!("n{b}"));
        }

        // Reference reachability over the same undirected edges.
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); 15];
        adjacency[0].push(1);
        adjacency[1].push(0);
        for (a, b) in edges.iter().copied().filter(|(a, b)| a != b) {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
        let mut reachable = HashSet::new();
        let mut stack = vec![0usize];
        while let Some(n) = stack.pop() {
            if reachable.insert(n) {
                stack.extend(adjacency[n].iter().copied());
            }
        }
        reachable.remove(&0);

        let mut graph = NetworkGraph::new(&substrate, "n0");
        let found = graph.discover(|_| true);

        let names: Vec<&str> = found.iter().map(|n| n.name.as_str()).collect();
        let unique: HashSet<&str> = names.iter().copied().collect();
        prop_assert_eq!(unique.len(), names.len());
        prop_assert!(!unique.contains("n0"));

        let expected: HashSet<String> = reachable.iter().map(|i| format!("n{i}")).collect();
        let got: HashSet<String> = names.iter().map(|s| s.to_string()).collect();
        prop_assert_eq!(got, expected);
        prop_assert_eq!(graph.paths().len(), reachable.len() + 1);
    }
}
