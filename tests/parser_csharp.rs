use codesketch::core::{Language, Relation};
use codesketch::parsers::manifest::DefaultManifestParser;
use codesketch::parsers::{analyze_internal_relations, extract_dependencies, extract_structure, ScanContext};
use std::fs;

const ORDERS: &str = r#"using System;
using System.Collections.Generic;

namespace Shop.Orders
{
    public class OrderService : BaseService, IOrderService
    {
        public string Name { get; set; }

        public Order Place(int id)
        {
            return Build(id);
        }

        private Order Build(int id) => new Order();
    }

    public interface IOrderService { }
}
"#;

#[test]
fn structure_shows_namespace_usings_types_and_methods() {
    let lines = extract_structure(ORDERS, Language::CSharp, &ScanContext::unbounded());
    assert_eq!(
        lines,
        vec![
            "",
            "Namespace: Shop.Orders",
            "",
            "Usings:",
            "  └── Using: System",
            "  └── Using: System.Collections.Generic",
            "",
            "Types:",
            "  └── Class: OrderService : BaseService, IOrderService",
            "  └── Interface: IOrderService",
            "",
            "Methods:",
            "  └── Method: Place(int id)",
            "  └── Method: Build(int id)",
        ]
    );
}

#[test]
fn types_are_exported_under_their_namespace() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("Orders.cs");
    fs::write(&file, ORDERS).unwrap();

    let deps = extract_dependencies(
        &file,
        Language::CSharp,
        &DefaultManifestParser::new(),
        &ScanContext::unbounded(),
    );

    let exports: Vec<&str> = deps.exports.iter().map(String::as_str).collect();
    assert_eq!(
        exports,
        vec![
            "Shop.Orders.IOrderService",
            "Shop.Orders.OrderService",
            "namespace:Shop.Orders",
        ]
    );
    assert!(deps.imports.contains("System.Collections.Generic"));
    for symbol in ["OrderService", "IOrderService", "Place", "Build", "Name"] {
        assert!(deps.symbols.contains(symbol), "missing symbol {symbol}");
    }
}

#[test]
fn members_and_properties_belong_to_their_type() {
    let analysis =
        analyze_internal_relations(ORDERS, Language::CSharp, &ScanContext::unbounded()).unwrap();

    assert_eq!(analysis.symbols.describe("namespace:Shop.Orders"), "namespace");
    assert_eq!(analysis.symbols.describe("IOrderService"), "interface");
    assert_eq!(analysis.symbols.describe("Place"), "method of OrderService");
    assert_eq!(analysis.symbols.describe("Build"), "method of OrderService");
    assert_eq!(analysis.symbols.describe("Name"), "property of OrderService");

    let service = analysis.relations.get("OrderService");
    assert_eq!(service[0], Relation::InheritsFrom("BaseService".into()));
    assert_eq!(service[1], Relation::InheritsFrom("IOrderService".into()));
    assert!(service.contains(&Relation::HasMethod("Place".into())));
    assert!(service.contains(&Relation::HasMethod("Build".into())));
}
