//! Fragment collection over a solved graph.
//!
//! Walks packages in resolution order (the synthetic root contributes
//! nothing), concatenates their flag fragments, then applies sysroot
//! relocation, system directory filtering, the optional type filter and
//! deduplication. Compiler flags render with non-`-I` fragments grouped
//! before `-I` fragments; linker flags keep collected order.

use pcq_core::{Fragment, FragmentList, ResolveConfig};

use crate::graph::SolvedGraph;

/// Collect compiler flag fragments from every package in the graph.
pub fn collect_cflags(graph: &SolvedGraph, config: &ResolveConfig) -> FragmentList {
    let mut list = FragmentList::new();
    for package in graph.packages_in_order() {
        list.extend_from(&package.cflags);
        if config.merges_private_fragments() {
            list.extend_from(&package.cflags_private);
        }
    }
    let includedirs = if config.keep_system_cflags {
        Vec::new()
    } else {
        config.system_includedirs.clone()
    };
    finalize(list, config, &[], &includedirs)
}

/// Collect linker flag fragments from every package in the graph.
pub fn collect_libs(graph: &SolvedGraph, config: &ResolveConfig) -> FragmentList {
    let mut list = FragmentList::new();
    for package in graph.packages_in_order() {
        list.extend_from(&package.libs);
        if config.merges_private_fragments() {
            list.extend_from(&package.libs_private);
        }
    }
    let libdirs = if config.keep_system_libs {
        Vec::new()
    } else {
        config.system_libdirs.clone()
    };
    finalize(list, config, &libdirs, &[])
}

fn finalize(
    mut list: FragmentList,
    config: &ResolveConfig,
    libdirs: &[String],
    includedirs: &[String],
) -> FragmentList {
    if let Some(sysroot) = &config.sysroot_dir {
        list.relocate(sysroot, config.fdo_sysroot_rules);
    }
    let mut list = list.without_system_dirs(libdirs, includedirs);
    if let Some(types) = &config.fragment_filter {
        list = list.filter_types(types);
    }
    list.deduplicate()
}

/// Render compiler flags: non-`-I` fragments first, include paths after,
/// each group keeping collected order.
pub fn render_cflags(list: &FragmentList, config: &ResolveConfig) -> Vec<String> {
    let other = list.filter(|f| !f.is_include());
    let includes = list.filter(Fragment::is_include);
    let mut ordered = other;
    ordered.extend_from(&includes);
    render(&ordered, config)
}

/// Render linker flags in collected order.
pub fn render_libs(list: &FragmentList, config: &ResolveConfig) -> Vec<String> {
    render(list, config)
}

fn render(list: &FragmentList, config: &ResolveConfig) -> Vec<String> {
    if config.msvc_syntax {
        list.render_msvc()
    } else {
        list.render_tokens()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcq_core::{Package, PackageRef};

    use crate::graph::{EdgeKind, SolvedGraph};

    fn pkg(id: &str, cflags: &str, libs: &str) -> PackageRef {
        Package {
            id: id.to_string(),
            cflags: FragmentList::parse(cflags),
            libs: FragmentList::parse(libs),
            ..Package::default()
        }
        .into_ref()
    }

    fn graph_of(packages: Vec<PackageRef>) -> SolvedGraph {
        let mut graph = SolvedGraph::new(Package::synthetic("world").into_ref());
        let root = graph.root();
        for package in packages {
            let index = graph.add_package(package);
            graph.add_edge(root, index, EdgeKind::Public);
        }
        graph
    }

    #[test]
    fn test_cflags_group_non_include_first() {
        let graph = graph_of(vec![pkg("foo", "-I/test/include/foo -fPIC", "")]);
        let config = ResolveConfig::default();
        let list = collect_cflags(&graph, &config);
        assert_eq!(
            render_cflags(&list, &config),
            vec!["-fPIC", "-I/test/include/foo"]
        );
    }

    #[test]
    fn test_libs_keep_collected_order() {
        let graph = graph_of(vec![pkg("foo", "", "-L/test/lib -lfoo")]);
        let config = ResolveConfig::default();
        let list = collect_libs(&graph, &config);
        assert_eq!(render_libs(&list, &config), vec!["-L/test/lib", "-lfoo"]);
    }

    #[test]
    fn test_deduplicate_across_packages_first_wins() {
        let graph = graph_of(vec![
            pkg("a", "", "-L/shared/lib -la"),
            pkg("b", "", "-L/shared/lib -lb"),
        ]);
        let config = ResolveConfig::default();
        let list = collect_libs(&graph, &config);
        assert_eq!(
            render_libs(&list, &config),
            vec!["-L/shared/lib", "-la", "-lb"]
        );
    }

    #[test]
    fn test_system_dirs_filtered_by_default() {
        let graph = graph_of(vec![pkg(
            "foo",
            "-I/usr/include -I/opt/include",
            "-L/usr/lib -lfoo",
        )]);
        let config = ResolveConfig::default();
        assert_eq!(
            render_cflags(&collect_cflags(&graph, &config), &config),
            vec!["-I/opt/include"]
        );
        assert_eq!(
            render_libs(&collect_libs(&graph, &config), &config),
            vec!["-lfoo"]
        );
    }

    #[test]
    fn test_keep_system_flags() {
        let graph = graph_of(vec![pkg("foo", "-I/usr/include", "-L/usr/lib -lfoo")]);
        let config = ResolveConfig::builder()
            .keep_system_cflags(true)
            .keep_system_libs(true)
            .build();
        assert_eq!(
            render_cflags(&collect_cflags(&graph, &config), &config),
            vec!["-I/usr/include"]
        );
        assert_eq!(
            render_libs(&collect_libs(&graph, &config), &config),
            vec!["-L/usr/lib", "-lfoo"]
        );
    }

    #[test]
    fn test_sysroot_relocation() {
        let graph = graph_of(vec![pkg("foo", "-I/opt/include", "-L/opt/lib -lfoo")]);
        let config = ResolveConfig::builder().sysroot_dir("/cross").build();
        assert_eq!(
            render_cflags(&collect_cflags(&graph, &config), &config),
            vec!["-I/cross/opt/include"]
        );
        assert_eq!(
            render_libs(&collect_libs(&graph, &config), &config),
            vec!["-L/cross/opt/lib", "-lfoo"]
        );
    }

    #[test]
    fn test_private_fragments_only_in_static() {
        let mut base = Package {
            id: "foo".to_string(),
            libs: FragmentList::parse("-lfoo"),
            libs_private: FragmentList::parse("-lm"),
            ..Package::default()
        };
        base.cflags = FragmentList::new();
        let graph = graph_of(vec![base.into_ref()]);

        let shared = ResolveConfig::default();
        assert_eq!(
            render_libs(&collect_libs(&graph, &shared), &shared),
            vec!["-lfoo"]
        );

        let static_cfg = ResolveConfig::builder().static_link(true).build();
        assert_eq!(
            render_libs(&collect_libs(&graph, &static_cfg), &static_cfg),
            vec!["-lfoo", "-lm"]
        );

        let pure_cfg = ResolveConfig::builder().static_link(true).pure(true).build();
        assert_eq!(
            render_libs(&collect_libs(&graph, &pure_cfg), &pure_cfg),
            vec!["-lfoo"]
        );
    }

    #[test]
    fn test_fragment_filter() {
        let graph = graph_of(vec![pkg("foo", "-I/opt/include -DX", "-L/opt/lib -lfoo")]);
        let config = ResolveConfig::builder().fragment_filter("l").build();
        assert_eq!(
            render_libs(&collect_libs(&graph, &config), &config),
            vec!["-lfoo"]
        );
    }

    #[test]
    fn test_msvc_rendering() {
        let graph = graph_of(vec![pkg("foo", "-I/opt/include", "-L/opt/lib -lfoo")]);
        let config = ResolveConfig::builder().msvc_syntax(true).build();
        assert_eq!(
            render_libs(&collect_libs(&graph, &config), &config),
            vec!["/LIBPATH:/opt/lib", "foo.lib"]
        );
    }
}
