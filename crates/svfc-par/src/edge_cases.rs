//! Whole-parser edge cases: recovery, round-trip, and the re-parse law.

use svfc_pre::{Preprocessor, PreprocessorOptions};
use svfc_util::{Arena, Handler, SourceMap};

use crate::ast::{CompilationUnit, ModuleItemSyntax, SyntaxKind, SyntaxWrite};
use crate::Parser;

fn parse_unit<'a>(
    arena: &'a Arena,
    handler: &'a Handler,
    sources: &'a mut SourceMap,
    text: &str,
) -> &'a CompilationUnit<'a> {
    let root = sources.add_file("edge.sv", text);
    let pp = Preprocessor::new(arena, sources, handler, root, PreprocessorOptions::default());
    let mut parser = Parser::new(arena, handler, pp);
    parser.parse_compilation_unit()
}

fn module_item_kinds(unit: &CompilationUnit<'_>) -> Vec<SyntaxKind> {
    unit.modules[0].items.iter().map(|i| i.kind()).collect()
}

#[test]
fn empty_input_yields_empty_unit() {
    let arena = Arena::new();
    let handler = Handler::new();
    let mut sources = SourceMap::new();
    let unit = parse_unit(&arena, &handler, &mut sources, "");
    assert!(unit.modules.is_empty());
    assert!(!handler.has_errors());
}

#[test]
fn full_module_roundtrip() {
    let arena = Arena::new();
    let handler = Handler::new();
    let mut sources = SourceMap::new();
    let text = "\
module counter #(parameter WIDTH = 8) (
    input  logic             clk,
    input  logic             rst_n,
    output logic [WIDTH-1:0] count
);
    always_ff @(posedge clk or negedge rst_n) begin
        if (!rst_n)
            count <= '0;
        else
            count <= count + 1'b1;
    end
endmodule
";
    let unit = parse_unit(&arena, &handler, &mut sources, text);
    assert!(!handler.has_errors());
    assert_eq!(unit.to_text(), text);
}

#[test]
fn reparse_is_structurally_idempotent() {
    let arena = Arena::new();
    let handler = Handler::new();
    let mut sources = SourceMap::new();
    let text = "module m(input logic a); wire w = a; assign w = ~a; endmodule\n";

    let unit = parse_unit(&arena, &handler, &mut sources, text);
    let serialized = unit.to_text();

    let arena2 = Arena::new();
    let handler2 = Handler::new();
    let mut sources2 = SourceMap::new();
    let unit2 = parse_unit(&arena2, &handler2, &mut sources2, &serialized);

    assert_eq!(module_item_kinds(unit), module_item_kinds(unit2));
    assert_eq!(unit.modules[0].header.name.raw(), unit2.modules[0].header.name.raw());
    assert_eq!(unit2.to_text(), serialized);
}

#[test]
fn multiple_errors_all_reported() {
    let arena = Arena::new();
    let handler = Handler::new();
    let mut sources = SourceMap::new();
    let text = "module a\nwire w\nendmodule\nmodule b; 99; endmodule\n";
    let unit = parse_unit(&arena, &handler, &mut sources, text);

    // Parsing never stops at the first error; both modules come back and
    // each independent problem is reported.
    assert_eq!(unit.modules.len(), 2);
    assert!(handler.error_count() >= 2);
}

#[test]
fn nested_begin_blocks_recover_from_missing_end() {
    let arena = Arena::new();
    let handler = Handler::new();
    let mut sources = SourceMap::new();
    let text = "module m; initial begin begin x = 1; end endmodule\n";
    let unit = parse_unit(&arena, &handler, &mut sources, text);
    assert!(handler.has_errors());
    assert!(!unit.modules[0].endmodule.is_missing());
}

#[test]
fn instantiation_array_of_instances() {
    let arena = Arena::new();
    let handler = Handler::new();
    let mut sources = SourceMap::new();
    let text = "module m; buf_cell u0(a, b), u1(c, d); endmodule\n";
    let unit = parse_unit(&arena, &handler, &mut sources, text);
    match &unit.modules[0].items[0] {
        ModuleItemSyntax::Instantiation(inst) => {
            assert_eq!(inst.instances.item_count(), 2);
        }
        other => panic!("expected instantiation, got {:?}", other.kind()),
    }
    assert!(!handler.has_errors());
}

#[test]
fn macro_expanded_module_parses() {
    let arena = Arena::new();
    let handler = Handler::new();
    let mut sources = SourceMap::new();
    let text = "`define REG_WIDTH 16\nmodule m; logic [`REG_WIDTH-1:0] r; endmodule\n";
    let root = sources.add_file("m.sv", text);
    let pp = Preprocessor::new(&arena, &sources, &handler, root, PreprocessorOptions::default());
    let mut parser = Parser::new(&arena, &handler, pp);
    let unit = parser.parse_compilation_unit();

    assert!(!handler.has_errors());
    assert_eq!(module_item_kinds(unit), vec![SyntaxKind::VariableDeclaration]);
}

#[test]
fn conditional_compilation_reaches_parser_correctly() {
    let arena = Arena::new();
    let handler = Handler::new();
    let mut sources = SourceMap::new();
    let text = "module m;\n`ifdef FPGA\nwire fpga_only;\n`else\nwire asic_only;\n`endif\nendmodule\n";
    let root = sources.add_file("m.sv", text);
    let pp = Preprocessor::new(&arena, &sources, &handler, root, PreprocessorOptions::default());
    let mut parser = Parser::new(&arena, &handler, pp);
    let unit = parser.parse_compilation_unit();

    assert!(!handler.has_errors());
    match &unit.modules[0].items[0] {
        ModuleItemSyntax::NetDeclaration(net) => {
            let name = net.declarators.items().next().unwrap().name.raw();
            assert_eq!(name, "asic_only");
        }
        other => panic!("expected net declaration, got {:?}", other.kind()),
    }
    // Dropped branch text and directives survive in the tree's trivia.
    assert_eq!(unit.to_text(), text);
}

#[test]
fn deeply_nested_expressions_parse() {
    let arena = Arena::new();
    let handler = Handler::new();
    let mut sources = SourceMap::new();
    let mut expr = String::from("x");
    for _ in 0..64 {
        expr = format!("({} + 1)", expr);
    }
    let text = format!("module m; assign y = {}; endmodule\n", expr);
    let unit = parse_unit(&arena, &handler, &mut sources, &text);
    assert!(!handler.has_errors());
    assert_eq!(unit.to_text(), text);
}

#[test]
fn arena_growth_is_linear_in_input() {
    let arena_small = Arena::new();
    let handler = Handler::new();
    let mut sources = SourceMap::new();
    let small = "module m; wire w; endmodule\n".repeat(10);
    parse_unit(&arena_small, &handler, &mut sources, &small);
    let small_bytes = arena_small.allocated_bytes();

    let arena_large = Arena::new();
    let handler2 = Handler::new();
    let mut sources2 = SourceMap::new();
    let large = "module m; wire w; endmodule\n".repeat(100);
    parse_unit(&arena_large, &handler2, &mut sources2, &large);
    let large_bytes = arena_large.allocated_bytes();

    // 10x the input should stay within ~20x the memory, not explode.
    assert!(large_bytes < small_bytes * 20);
}
