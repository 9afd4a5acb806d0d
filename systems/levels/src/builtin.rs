use contagion_core::{Adjacency, LevelNumber, LevelTemplate, TemplateError};

use crate::default_title;

struct Layout {
    adjacency: Adjacency,
    rows: &'static str,
}

const fn orthogonal(rows: &'static str) -> Layout {
    Layout {
        adjacency: Adjacency::Orthogonal,
        rows,
    }
}

const fn octile(rows: &'static str) -> Layout {
    Layout {
        adjacency: Adjacency::Octile,
        rows,
    }
}

const LAYOUTS: [Layout; 12] = [
    orthogonal(
        "
        bbgg
        bRrg
        yyrr
        ",
    ),
    orthogonal(
        "
        bbyyg
        rBbyg
        rrggg
        yyrbb
        ",
    ),
    orthogonal(
        "
        gbbyy
        gbRry
        ggrrb
        yybbb
        ",
    ),
    orthogonal(
        "
        .bbb.
        rrGgg
        yyGyy
        .bbb.
        ",
    ),
    orthogonal(
        "
        bbrrgg
        ybRrgy
        yybbgy
        rrbyyr
        ",
    ),
    orthogonal(
        "
        rrbbyy
        gRbbYg
        ggrryg
        bbyrrb
        bgyyrb
        ",
    ),
    octile(
        "
        brb.
        rBrg
        gbgy
        .yyg
        ",
    ),
    orthogonal(
        "
        yyybbb
        rrRggg
        bbbyyy
        gggRrr
        ",
    ),
    octile(
        "
        gbryg
        bgRgb
        ryByr
        bgYgb
        gbryg
        ",
    ),
    orthogonal(
        "
        bbgg..
        rBgyy.
        rrbbyy
        .ggbRr
        ..yyrr
        ",
    ),
    orthogonal(
        "
        ppbbpp
        pPbbPp
        yyrryy
        ggrrgg
        ",
    ),
    octile(
        "
        pbpbp
        bpPpb
        ygyPy
        gyg.g
        ",
    ),
];

pub(crate) fn templates() -> Result<Vec<LevelTemplate>, TemplateError> {
    (1..)
        .zip(LAYOUTS.iter())
        .map(|(number, layout)| {
            let level = LevelNumber::clamped(number);
            LevelTemplate::from_ascii(default_title(level), layout.adjacency, layout.rows)
        })
        .collect()
}
