// crates/hf_mesh/tests/partition_generation.rs

//! 列条带分区与单分区网格的一致性测试

use std::collections::HashSet;

use hf_mesh::{BoundaryTags, MeshPartition, RectMeshGenerator};

fn owned_global_ids(mesh: &MeshPartition) -> Vec<usize> {
    mesh.owned_cells()
        .filter_map(|c| mesh.cell_global_id[c])
        .collect()
}

#[test]
fn test_partitions_cover_global_mesh_once() {
    let gen = RectMeshGenerator::new(7, 3, 7.0, 3.0);
    let serial = gen.build().unwrap();

    for n_parts in 1..=4 {
        let parts = gen.partition_columns(n_parts).unwrap();
        let mut seen = HashSet::new();
        let mut area = 0.0;
        for part in &parts {
            for g in owned_global_ids(part) {
                assert!(seen.insert(g), "全局单元 {} 被多个分区拥有", g);
            }
            area += part.statistics().total_area;
        }
        assert_eq!(seen.len(), gen.n_cells());
        assert!((area - serial.statistics().total_area).abs() < 1e-10);
    }
}

#[test]
fn test_boundary_edges_conserved_across_partitions() {
    let gen = RectMeshGenerator::new(6, 2, 3.0, 1.0).with_tags(BoundaryTags::uniform("zero_flux"));
    let serial = gen.build().unwrap();
    let parts = gen.partition_columns(3).unwrap();

    let total: usize = parts.iter().map(|p| p.boundary_edges.len()).sum();
    assert_eq!(total, serial.boundary_edges.len());
    assert!(parts
        .iter()
        .flat_map(|p| p.boundary_edges.iter())
        .all(|b| b.tag == "zero_flux"));
}

#[test]
fn test_owned_cell_edge_sets_match_serial() {
    // 每个拥有单元在分区中的边数与单分区网格中一致
    let gen = RectMeshGenerator::new(5, 4, 1.0, 1.0);
    let serial = gen.build().unwrap();
    let parts = gen.partition_columns(2).unwrap();

    let degree = |mesh: &MeshPartition| {
        let mut deg = vec![0usize; mesh.n_cells];
        for e in 0..mesh.n_edges() {
            let (i, j) = mesh.edge_cells(e);
            deg[i] += 1;
            deg[j] += 1;
        }
        mesh.owned_cells()
            .map(|c| (mesh.cell_global_id[c].unwrap(), deg[c]))
            .collect::<Vec<_>>()
    };

    let serial_deg: std::collections::HashMap<_, _> = degree(&serial).into_iter().collect();
    for part in &parts {
        for (g, d) in degree(part) {
            assert_eq!(serial_deg[&g], d, "全局单元 {} 的边数不一致", g);
        }
    }
}
