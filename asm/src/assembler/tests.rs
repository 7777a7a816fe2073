use super::*;

fn assemble(source: &str) -> Result<Module, AssemblerError> {
    let lines: Vec<&str> = source.lines().collect();
    Assembler::new().assemble(&lines)
}

fn data(source: &str) -> Vec<u8> {
    assemble(source).unwrap().data().to_vec()
}

fn error(source: &str) -> (usize, ErrorKind) {
    let AssemblerError { line, kind } = assemble(source).unwrap_err();
    (line, kind)
}

fn invalid_operands(source: &str) -> bool {
    matches!(assemble(source), Err(AssemblerError { kind: ErrorKind::InvalidOperands(_), .. }))
}

#[test_log::test]
fn hello() {
    let module = assemble("start: mvi a, 5\nhlt\n").unwrap();
    assert_eq!(&[0x3E, 0x05, 0x76], module.data());
    assert_eq!(1, module.symtab().len());
    assert_eq!(Some(0), module.symtab().get("start"));
}

#[test]
fn implied() {
    let data = data(
        r#"
            nop
            hlt
            ret
            rnz
            rz
            rnc
            rc
            rpo
            rpe
            rp
            rm
            rlc
            rrc
            ral
            rar
            cma
            cmc
            stc
            daa
            ei
            di
            xchg
            xthl
            sphl
            pchl
        "#,
    );

    #[rustfmt::skip]
    assert_eq!(vec![
        0x00,
        0x76,
        0xC9,
        0xC0,
        0xC8,
        0xD0,
        0xD8,
        0xE0,
        0xE8,
        0xF0,
        0xF8,
        0x07,
        0x0F,
        0x17,
        0x1F,
        0x2F,
        0x3F,
        0x37,
        0x27,
        0xFB,
        0xF3,
        0xEB,
        0xE3,
        0xF9,
        0xE9,
    ], data);
}

#[test]
fn mov() {
    let data = data(
        r#"
            mov b, a
            mov c, d
            mov a, m
            mov m, a
            MOV M, B
            mov l,h
        "#,
    );

    #[rustfmt::skip]
    assert_eq!(vec![
        0x47,
        0x4A,
        0x7E,
        0x77,
        0x70,
        0x6C,
    ], data);
}

#[test]
fn mov_memory_to_memory() {
    assert!(invalid_operands("mov m, m"));
}

#[test]
fn mvi() {
    let data = data(
        r#"
            mvi b, 0
            mvi c, 09h
            mvi m, 0ffh
            mvi a, 'A'
            mvi e, 101b
        "#,
    );

    #[rustfmt::skip]
    assert_eq!(vec![
        0x06, 0x00,
        0x0E, 0x09,
        0x36, 0xFF,
        0x3E, 0x41,
        0x1E, 0x05,
    ], data);
}

#[test]
fn immediates_fit_in_a_byte() {
    assert!(invalid_operands("mvi a, 256"));
    assert!(invalid_operands("adi 100h"));
    assert!(!invalid_operands("adi 0ffh"));
}

#[test]
fn arithmetic() {
    let data = data(
        r#"
            add b
            adc c
            sub d
            sbb e
            ana h
            xra l
            ora m
            cmp a
        "#,
    );

    #[rustfmt::skip]
    assert_eq!(vec![
        0x80,
        0x89,
        0x92,
        0x9B,
        0xA4,
        0xAD,
        0xB6,
        0xBF,
    ], data);
}

#[test]
fn arithmetic_immediate() {
    let data = data(
        r#"
            adi 1
            aci 2
            sui 3
            sbi 4
            ani 0fh
            xri 5
            ori 80h
            cpi 'z'
            in 1
            out 2
        "#,
    );

    #[rustfmt::skip]
    assert_eq!(vec![
        0xC6, 0x01,
        0xCE, 0x02,
        0xD6, 0x03,
        0xDE, 0x04,
        0xE6, 0x0F,
        0xEE, 0x05,
        0xF6, 0x80,
        0xFE, 0x7A,
        0xDB, 0x01,
        0xD3, 0x02,
    ], data);
}

#[test]
fn inr_dcr() {
    let data = data(
        r#"
            inr a
            dcr a
            inr m
            dcr b
            inr l
        "#,
    );

    #[rustfmt::skip]
    assert_eq!(vec![
        0x3C,
        0x3D,
        0x34,
        0x05,
        0x2C,
    ], data);
}

#[test]
fn register_pairs() {
    let data = data(
        r#"
            push b
            push d
            push h
            push psw
            pop bc
            pop psw
            dad sp
            dad h
            inx de
            inx sp
            dcx b
            dcx hl
        "#,
    );

    #[rustfmt::skip]
    assert_eq!(vec![
        0xC5,
        0xD5,
        0xE5,
        0xF5,
        0xC1,
        0xF1,
        0x39,
        0x29,
        0x13,
        0x33,
        0x0B,
        0x2B,
    ], data);
}

#[test]
fn register_pair_legality() {
    assert_eq!((1, ErrorKind::InvalidRegister("sp".to_string())), error("push sp"));
    assert_eq!((1, ErrorKind::InvalidRegister("psw".to_string())), error("dad psw"));
    assert_eq!((1, ErrorKind::InvalidRegister("psw".to_string())), error("lxi psw, 0"));
    assert_eq!((1, ErrorKind::InvalidRegister("a".to_string())), error("inx a"));
}

#[test]
fn lxi() {
    let data = data(
        r#"
            lxi sp, 1000h
            lxi h, 1234h
            lxi b, 'A'
            lxi d, message
        message:
            db 'Hi$'
        "#,
    );

    #[rustfmt::skip]
    assert_eq!(vec![
        0x31, 0x00, 0x10,
        0x21, 0x34, 0x12,
        0x01, 0x41, 0x00,
        0x11, 0x0C, 0x00,
        b'H', b'i', b'$',
    ], data);
}

#[test]
fn ldax_stax() {
    let data = data(
        r#"
            ldax b
            ldax d
            stax b
            stax de
        "#,
    );

    #[rustfmt::skip]
    assert_eq!(vec![
        0x0A,
        0x1A,
        0x02,
        0x12,
    ], data);

    assert_eq!((1, ErrorKind::InvalidRegister("h".to_string())), error("ldax h"));
    assert_eq!((1, ErrorKind::InvalidRegister("sp".to_string())), error("stax sp"));
}

#[test]
fn addresses() {
    let data = data(
        r#"
            lda 1234h
            sta 1234h
            lhld 0100h
            shld 0100h
            jmp 0
            jnz 1
            jz 2
            jnc 3
            jc 4
            jpo 5
            jpe 6
            jp 7
            jm 8
            call 0abcdh
            cnz 1
            cz 2
            cnc 3
            cc 4
            cpo 5
            cpe 6
            cp 7
            cm 8
        "#,
    );

    #[rustfmt::skip]
    assert_eq!(vec![
        0x3A, 0x34, 0x12,
        0x32, 0x34, 0x12,
        0x2A, 0x00, 0x01,
        0x22, 0x00, 0x01,
        0xC3, 0x00, 0x00,
        0xC2, 0x01, 0x00,
        0xCA, 0x02, 0x00,
        0xD2, 0x03, 0x00,
        0xDA, 0x04, 0x00,
        0xE2, 0x05, 0x00,
        0xEA, 0x06, 0x00,
        0xF2, 0x07, 0x00,
        0xFA, 0x08, 0x00,
        0xCD, 0xCD, 0xAB,
        0xC4, 0x01, 0x00,
        0xCC, 0x02, 0x00,
        0xD4, 0x03, 0x00,
        0xDC, 0x04, 0x00,
        0xE4, 0x05, 0x00,
        0xEC, 0x06, 0x00,
        0xF4, 0x07, 0x00,
        0xFC, 0x08, 0x00,
    ], data);
}

#[test]
fn rst() {
    let data = data(
        r#"
            rst 0
            rst 1
            rst 7
        "#,
    );

    #[rustfmt::skip]
    assert_eq!(vec![
        0xC7,
        0xCF,
        0xFF,
    ], data);

    assert!(invalid_operands("rst 8"));
    assert!(invalid_operands("rst a"));
    assert!(invalid_operands("rst 1h"));
}

#[test_log::test]
fn labels() {
    let module = assemble(
        r#"
                org 100h
        start:  jmp done
                call sub
                jz start
                hlt
        sub:    ret
        done:   rst 7
        "#,
    )
    .unwrap();

    #[rustfmt::skip]
    assert_eq!(&[
        0xC3, 0x0B, 0x01,
        0xCD, 0x0A, 0x01,
        0xCA, 0x00, 0x01,
        0x76,
        0xC9,
        0xFF,
    ], module.data());

    assert_eq!(Some(0x0100), module.symtab().get("start"));
    assert_eq!(Some(0x010A), module.symtab().get("sub"));
    assert_eq!(Some(0x010B), module.symtab().get("done"));
}

#[test]
fn forward_references() {
    #[rustfmt::skip]
    assert_eq!(vec![
        0xC3, 0x04, 0x00,
        0x00,
        0x76,
    ], data("jmp later\nnop\nlater: hlt"));

    #[rustfmt::skip]
    assert_eq!(vec![
        0x02, 0x00,
        0x00,
    ], data("dw later\nlater: nop"));
}

#[test]
fn case_insensitive_names() {
    #[rustfmt::skip]
    assert_eq!(vec![
        0x3E, 0x05,
        0xC3, 0x02, 0x00,
    ], data("MVI A, 5\nLoop: JMP LOOP"));
}

#[test]
fn quoted_characters() {
    #[rustfmt::skip]
    assert_eq!(vec![
        0xFE, 0x20,
        0x3E, 0x2C,
        0xFE, 0x3B,
        0x06, 0x27,
    ], data("cpi ' '\nmvi a, ','\ncpi ';' ; comment\nmvi b, \"'\""));
}

#[test]
fn directive_names_as_labels() {
    #[rustfmt::skip]
    assert_eq!(vec![
        0x00,
        0x00,
        0xC3, 0x00, 0x00,
        0xC3, 0x01, 0x00,
        0x21, 0x00, 0x00,
    ], data("title: nop\nequ: nop\njmp title\njmp equ\nlxi h, title"));
}

#[test]
fn comments_and_blank_lines() {
    assert_eq!(vec![0x00], data("; header\n\n  nop ; one\n\t\n"));
}

#[test]
fn label_only_lines() {
    let module = assemble("nop\nhere:\n  ; comment\nthere: ; comment\nhlt").unwrap();
    assert_eq!(&[0x00, 0x76], module.data());
    assert_eq!(Some(1), module.symtab().get("here"));
    assert_eq!(Some(1), module.symtab().get("there"));
}

#[test]
fn org() {
    let module = assemble("org 100h\nentry: org 200h\nnop\nlast: nop").unwrap();
    assert_eq!(&[0x00, 0x00], module.data());
    assert_eq!(Some(0x0200), module.symtab().get("entry"));
    assert_eq!(Some(0x0201), module.symtab().get("last"));
}

#[test]
fn org_takes_a_number() {
    assert_eq!((1, ErrorKind::InvalidNumber("1zh".to_string())), error("org 1zh"));
    assert_eq!(
        (2, ErrorKind::InvalidNumber("start".to_string())),
        error("start: nop\norg start")
    );
}

#[test]
fn equ() {
    let module = assemble("bdos equ 5\nmvi c, 9\ncall bdos\nbuf: equ 80h").unwrap();

    #[rustfmt::skip]
    assert_eq!(&[
        0x0E, 0x09,
        0xCD, 0x05, 0x00,
    ], module.data());

    assert_eq!(Some(5), module.symtab().get("bdos"));
    assert_eq!(Some(0x80), module.symtab().get("buf"));
}

#[test]
fn equ_errors() {
    assert!(invalid_operands("equ 5"));
    assert_eq!(
        (1, ErrorKind::UndefinedLabel("later".to_string())),
        error("x equ later\nlater: nop")
    );
    assert_eq!(
        (2, ErrorKind::DuplicateLabel("x".to_string())),
        error("x equ 1\nx equ 2")
    );
}

#[test]
fn here() {
    #[rustfmt::skip]
    assert_eq!(vec![
        0xC3, 0x00, 0x01,
        0x21, 0x06, 0x01,
    ], data("org 100h\njmp $\nlxi h, $+3"));

    let module = assemble("org 10h\nmark equ $+2\nnop").unwrap();
    assert_eq!(Some(0x12), module.symtab().get("mark"));
}

#[test]
fn db() {
    #[rustfmt::skip]
    assert_eq!(vec![
        0x02, 0x30, 0x05, 0x2A, 0x41, 0x42,
    ], data("db 2, 30h, 101b, '*', 'AB'"));

    #[rustfmt::skip]
    assert_eq!(vec![
        b'H', b'e', b'l', b'l', b'o', b'$',
    ], data("message: db 'Hello$'"));

    #[rustfmt::skip]
    assert_eq!(vec![
        b'a', b',', b' ', b'b', b';',
    ], data("db 'a, b', \";\" ; comment"));
}

#[test]
fn db_labels() {
    #[rustfmt::skip]
    assert_eq!(vec![
        0x05,
        0x34, 0x12,
    ], data("five equ 5\nbig equ 1234h\ndb five, big"));

    assert_eq!(
        (1, ErrorKind::UndefinedLabel("later".to_string())),
        error("db later\nlater: nop")
    );
}

#[test]
fn db_errors() {
    assert_eq!((1, ErrorKind::InvalidLabel("label".to_string())), error("label db 1, 2, 3"));
    assert!(invalid_operands("db 1,,2"));
    assert!(invalid_operands("db 256"));
    assert!(invalid_operands("db"));
}

#[test]
fn dw() {
    #[rustfmt::skip]
    assert_eq!(vec![
        0x34, 0x12,
        0x06, 0x00,
        0x00, 0x00,
    ], data("dw 1234h\ndw $+4\ndw 0"));
}

#[test]
fn ds() {
    let module = assemble("ds 3\nx: nop\nbuf: ds 10h\ny: nop").unwrap();
    assert_eq!(vec![0x00; 3 + 1 + 0x10 + 1].as_slice(), module.data());
    assert_eq!(Some(3), module.symtab().get("x"));
    assert_eq!(Some(4), module.symtab().get("buf"));
    assert_eq!(Some(0x14), module.symtab().get("y"));

    assert_eq!(
        (1, ErrorKind::UndefinedLabel("size".to_string())),
        error("ds size\nsize equ 4")
    );
}

#[test]
fn end() {
    assert_eq!(vec![0x00], data("nop\nend\nhlt"));
    assert_eq!(vec![0x00], data("start: nop\nend start"));
    assert_eq!(vec![0x00], data("nop\nend\nthis is not assembly"));

    let module = assemble("nop\nstop: end\nlater: nop").unwrap();
    assert_eq!(Some(1), module.symtab().get("stop"));
    assert_eq!(None, module.symtab().get("later"));
}

#[test]
fn name_and_title() {
    assert_eq!(vec![0x00], data("name hello\ntitle 'Hello, world'\nnop"));
    assert!(invalid_operands("name"));
    assert!(invalid_operands("name a, b"));
}

#[test]
fn reassembly_is_deterministic() {
    let source = "org 100h\nstart: lxi d, msg\nmvi c, 9\ncall 5\nret\nmsg: db 'Hi$'";
    assert_eq!(assemble(source), assemble(source));
}

#[test]
fn unknown_mnemonic() {
    assert_eq!((2, ErrorKind::UnknownMnemonic("foo".to_string())), error("nop\nfoo a"));
    assert_eq!((1, ErrorKind::UnknownMnemonic("ldir".to_string())), error("ldir"));
}

#[test]
fn wrong_arity() {
    assert!(invalid_operands("nop 1"));
    assert!(invalid_operands("hlt a, b"));
    assert!(invalid_operands("mov b"));
    assert!(invalid_operands("mov b,"));
    assert!(invalid_operands("jmp"));
    assert!(invalid_operands("inr a, b"));
    assert!(invalid_operands(", a"));
}

#[test]
fn invalid_register() {
    assert_eq!((1, ErrorKind::InvalidRegister("x".to_string())), error("inr x"));
    assert_eq!((1, ErrorKind::InvalidRegister("ix".to_string())), error("mov a, ix"));
}

#[test]
fn invalid_number() {
    assert_eq!((1, ErrorKind::InvalidNumber("12g".to_string())), error("mvi a, 12g"));
    assert_eq!((1, ErrorKind::InvalidNumber("-1".to_string())), error("mvi a, -1"));
    assert_eq!((1, ErrorKind::InvalidNumber("10000h".to_string())), error("jmp 10000h"));
}

#[test]
fn invalid_expression() {
    assert_eq!((1, ErrorKind::InvalidExpression("$#2".to_string())), error("jmp $#2"));
    assert!(matches!(error("jmp a+1"), (1, ErrorKind::InvalidExpression(_))));
}

#[test]
fn undefined_label() {
    assert_eq!(
        (2, ErrorKind::UndefinedLabel("nowhere".to_string())),
        error("nop\njmp nowhere")
    );
}

#[test]
fn duplicate_label() {
    assert_eq!(
        (2, ErrorKind::DuplicateLabel("loop".to_string())),
        error("loop: nop\nLOOP: nop")
    );
}

#[test]
fn invalid_label() {
    assert_eq!((1, ErrorKind::InvalidLabel("3x".to_string())), error("3x: nop"));
    assert_eq!((1, ErrorKind::InvalidLabel("a-b".to_string())), error("a-b: nop"));
}

#[test]
fn last_memory_cell() {
    assert_eq!(vec![0x00], data("org 0FFFFh\nnop"));
    assert_eq!(vec![0x34, 0x12], data("org 0FFFEh\ndw 1234h"));
    assert_eq!(vec![0xC3, 0x00, 0x00], data("org 0FFFDh\njmp 0"));
    assert_eq!(0x10000, data("nop\nds 0FFFFh").len());
}

#[test]
fn address_overflow() {
    assert_eq!((3, ErrorKind::AddressOverflow), error("org 0FFFFh\nnop\nnop"));
    assert_eq!((3, ErrorKind::AddressOverflow), error("nop\nnop\nds 0FFFFh"));
    assert_eq!((2, ErrorKind::AddressOverflow), error("org 0FFFEh\njmp 0"));
    assert_eq!((2, ErrorKind::AddressOverflow), error("org 0FFFFh\nlast: jmp $"));
    assert_eq!((3, ErrorKind::AddressOverflow), error("org 0FFFFh\nnop\nafter: ds 0"));
    assert_eq!((3, ErrorKind::AddressOverflow), error("org 0FFFFh\nnop\nmvi a, $"));
}

#[test]
fn error_display() {
    let e = assemble("nop\nfoo a").unwrap_err();
    assert_eq!("line 2: unknown mnemonic \"foo\"", e.to_string());
}
