use crate::{config::TLayout, preonic_key_from_alias};

#[rustfmt::skip]
pub static LAYOUT: TLayout = TLayout::new(
    thkb_proc_macros::layers!(
        alias_resolver: preonic_key_from_alias,
        layers: [
            {   // 0
                name: "qwerty",
                rows: [
                    [       1,    2,    3,    4,    5,    6,    7,    8,    9,    0,  '-',    '='],
                    [     Esc,    Q,    W,    E,    R,    T,    Y,    U,    I,    O,    P,   Bksp],
                    [     Tab,    A,    S,    D,    F,    G,    H,    J,    K,    L,  ';',    '`'],
                    [    LSft,    Z,    X,    C,    V,    B,    N,    M,  ',',  '.',   Up,u:SftEnt],
                    [u:Function,LCtl,LAlt, LGui,u:Lower,Spc, Spc,u:Raise,'/', Left, Down,  Right],
                ]
            },
            {   // 1
                name: "colemak",
                rows: [
                    [       1,    2,    3,    4,    5,    6,    7,    8,    9,    0,  '-',    '='],
                    [     Esc,    Q,    W,    F,    P,    G,    J,    L,    U,    Y,  ';',   Bksp],
                    [     Tab,    A,    R,    S,    T,    D,    H,    N,    E,    I,    O,    '`'],
                    [    LSft,    Z,    X,    C,    V,    B,    K,    M,  ',',  '.',   Up,u:SftEnt],
                    [u:Function,LCtl,LAlt, LGui,u:Lower,Spc, Spc,u:Raise,'/', Left, Down,  Right],
                ]
            },
            {   // 2
                name: "dvorak",
                rows: [
                    [       1,    2,    3,    4,    5,    6,    7,    8,    9,    0,  '-',    '='],
                    [     Esc,  '`',  ',',  '.',    P,    Y,    F,    G,    C,    R,    L,   Bksp],
                    [     Tab,    A,    O,    E,    U,    I,    D,    H,    T,    N,    S,      Z],
                    [    LSft,  ';',    Q,    J,    K,    X,    B,    M,    W,    V,   Up,u:SftEnt],
                    [u:Function,LCtl,LAlt, LGui,u:Lower,Spc, Spc,u:Raise,'/', Left, Down,  Right],
                ]
            },
            {   // 3
                name: "lower",
                rows: [
                    [       *,    *,    *,    *,    *,    *,    *,    *,    *,    *,    *,      *],
                    [       *,    *,    *,    *,    *,    *,    *,    *,  '(',  ')',    *,    Del],
                    [       *,    1,    2,    3,    4,    5,  '-', Nubs,  '{',  '}',  "'",      *],
                    [       *,    6,    7,    8,    9,    0,  '=', Nuhs,  '[',  ']',   Up,      *],
                    [       *,    *,    *,    *,    *,    *,    *,    *, '\\', Left, Down,  Right],
                ]
            },
            {   // 4
                name: "raise",
                rows: [
                    [     '!',  '@',  '#',  '$',  '%',  '^',  '&',  '*',  '(',  ')',  '_',    '+'],
                    [       *, PCmm,   P7,   P8,   P9, PSls, PMns, PEql,    *,    *,    *,    Del],
                    [       *, PDot,   P4,   P5,   P6, PAst, PPls, PEnt,    *,    *,    *,      *],
                    [       *,   P0,   P1,   P2,   P3,    *,    *,    *,    *,    *, PgUp,      *],
                    [       *,    *,    *,    *,    *,    *,    *,    *,    *, Home, PgDn,    End],
                ]
            },
            {   // 5
                name: "function",
                rows: [
                    [      F1,   F2,   F3,   F4,   F5,   F6,   F7,   F8,   F9,  F10,  F11,    F12],
                    [       *,    *,    *,    *,    *,c:Rwd,c:Ply,c:Ffd,c:Mute,c:VDn,c:VUp,   Del],
                    [       *,   F1,   F2,   F3,   F4,   F5,    *,    *,    *,    *,    *,      *],
                    [    Caps,   F6,   F7,   F8,   F9,  F10,  F11,  F12,    *,m:Btn1,m:Up,m:Btn2],
                    [       *,    *,    *,    *,    *,    *,    *,    *,    *,m:Left,m:Down,m:Right],
                ]
            },
            {   // 6
                name: "adjust",
                rows: [
                    [      F1,   F2,   F3,   F4,   F5,   F6,   F7,   F8,   F9,  F10,  F11,    F12],
                    [       *,f:Reset,  *,    *,    *,    *,    *,    *,    *,    *,    *,    Del],
                    [       *,    *,f:MuMod,f:AuOn,f:AuOff,f:AgNorm,f:AgSwap,u:Qwerty,u:Colemak,u:Dvorak,*,*],
                    [       *,f:MuvDe,f:MuvIn,f:MuOn,f:MuOff,f:MiOn,f:MiOff,*,*,   *,    *,      *],
                    [       *,    *,    *,    *,    *,    *,    *,    *,    *,    *,    *,      *],
                ]
            },
        ]
    )
);
