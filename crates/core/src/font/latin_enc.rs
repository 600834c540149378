//! Latin character set and its four standard single-byte encodings.
//!
//! Each row carries a glyph name, its code in StandardEncoding,
//! MacRomanEncoding, WinAnsiEncoding and PDFDocEncoding, and the Unicode
//! character it names.

/// `(name, std, mac, win, pdf, unicode)`
pub type EncodingRow = (&'static str, Option<u8>, Option<u8>, Option<u8>, Option<u8>, char);

pub const ENCODING: &[EncodingRow] = &[
    ("A", Some(65), Some(65), Some(65), Some(65), '\u{0041}'),
    ("AE", Some(225), Some(174), Some(198), Some(198), '\u{00c6}'),
    ("Aacute", None, Some(231), Some(193), Some(193), '\u{00c1}'),
    ("Acircumflex", None, Some(229), Some(194), Some(194), '\u{00c2}'),
    ("Adieresis", None, Some(128), Some(196), Some(196), '\u{00c4}'),
    ("Agrave", None, Some(203), Some(192), Some(192), '\u{00c0}'),
    ("Aring", None, Some(129), Some(197), Some(197), '\u{00c5}'),
    ("Atilde", None, Some(204), Some(195), Some(195), '\u{00c3}'),
    ("B", Some(66), Some(66), Some(66), Some(66), '\u{0042}'),
    ("C", Some(67), Some(67), Some(67), Some(67), '\u{0043}'),
    ("Ccedilla", None, Some(130), Some(199), Some(199), '\u{00c7}'),
    ("D", Some(68), Some(68), Some(68), Some(68), '\u{0044}'),
    ("E", Some(69), Some(69), Some(69), Some(69), '\u{0045}'),
    ("Eacute", None, Some(131), Some(201), Some(201), '\u{00c9}'),
    ("Ecircumflex", None, Some(230), Some(202), Some(202), '\u{00ca}'),
    ("Edieresis", None, Some(232), Some(203), Some(203), '\u{00cb}'),
    ("Egrave", None, Some(233), Some(200), Some(200), '\u{00c8}'),
    ("Eth", None, None, Some(208), Some(208), '\u{00d0}'),
    ("Euro", None, None, Some(128), Some(160), '\u{20ac}'),
    ("F", Some(70), Some(70), Some(70), Some(70), '\u{0046}'),
    ("G", Some(71), Some(71), Some(71), Some(71), '\u{0047}'),
    ("H", Some(72), Some(72), Some(72), Some(72), '\u{0048}'),
    ("I", Some(73), Some(73), Some(73), Some(73), '\u{0049}'),
    ("Iacute", None, Some(234), Some(205), Some(205), '\u{00cd}'),
    ("Icircumflex", None, Some(235), Some(206), Some(206), '\u{00ce}'),
    ("Idieresis", None, Some(236), Some(207), Some(207), '\u{00cf}'),
    ("Igrave", None, Some(237), Some(204), Some(204), '\u{00cc}'),
    ("J", Some(74), Some(74), Some(74), Some(74), '\u{004a}'),
    ("K", Some(75), Some(75), Some(75), Some(75), '\u{004b}'),
    ("L", Some(76), Some(76), Some(76), Some(76), '\u{004c}'),
    ("Lslash", Some(232), None, None, Some(149), '\u{0141}'),
    ("M", Some(77), Some(77), Some(77), Some(77), '\u{004d}'),
    ("N", Some(78), Some(78), Some(78), Some(78), '\u{004e}'),
    ("Ntilde", None, Some(132), Some(209), Some(209), '\u{00d1}'),
    ("O", Some(79), Some(79), Some(79), Some(79), '\u{004f}'),
    ("OE", Some(234), Some(206), Some(140), Some(150), '\u{0152}'),
    ("Oacute", None, Some(238), Some(211), Some(211), '\u{00d3}'),
    ("Ocircumflex", None, Some(239), Some(212), Some(212), '\u{00d4}'),
    ("Odieresis", None, Some(133), Some(214), Some(214), '\u{00d6}'),
    ("Ograve", None, Some(241), Some(210), Some(210), '\u{00d2}'),
    ("Oslash", Some(233), Some(175), Some(216), Some(216), '\u{00d8}'),
    ("Otilde", None, Some(205), Some(213), Some(213), '\u{00d5}'),
    ("P", Some(80), Some(80), Some(80), Some(80), '\u{0050}'),
    ("Q", Some(81), Some(81), Some(81), Some(81), '\u{0051}'),
    ("R", Some(82), Some(82), Some(82), Some(82), '\u{0052}'),
    ("S", Some(83), Some(83), Some(83), Some(83), '\u{0053}'),
    ("Scaron", None, None, Some(138), Some(151), '\u{0160}'),
    ("T", Some(84), Some(84), Some(84), Some(84), '\u{0054}'),
    ("Thorn", None, None, Some(222), Some(222), '\u{00de}'),
    ("U", Some(85), Some(85), Some(85), Some(85), '\u{0055}'),
    ("Uacute", None, Some(242), Some(218), Some(218), '\u{00da}'),
    ("Ucircumflex", None, Some(243), Some(219), Some(219), '\u{00db}'),
    ("Udieresis", None, Some(134), Some(220), Some(220), '\u{00dc}'),
    ("Ugrave", None, Some(244), Some(217), Some(217), '\u{00d9}'),
    ("V", Some(86), Some(86), Some(86), Some(86), '\u{0056}'),
    ("W", Some(87), Some(87), Some(87), Some(87), '\u{0057}'),
    ("X", Some(88), Some(88), Some(88), Some(88), '\u{0058}'),
    ("Y", Some(89), Some(89), Some(89), Some(89), '\u{0059}'),
    ("Yacute", None, None, Some(221), Some(221), '\u{00dd}'),
    ("Ydieresis", None, Some(217), Some(159), Some(152), '\u{0178}'),
    ("Z", Some(90), Some(90), Some(90), Some(90), '\u{005a}'),
    ("Zcaron", None, None, Some(142), Some(153), '\u{017d}'),
    ("a", Some(97), Some(97), Some(97), Some(97), '\u{0061}'),
    ("aacute", None, Some(135), Some(225), Some(225), '\u{00e1}'),
    ("acircumflex", None, Some(137), Some(226), Some(226), '\u{00e2}'),
    ("acute", Some(194), Some(171), Some(180), Some(180), '\u{00b4}'),
    ("adieresis", None, Some(138), Some(228), Some(228), '\u{00e4}'),
    ("ae", Some(241), Some(190), Some(230), Some(230), '\u{00e6}'),
    ("agrave", None, Some(136), Some(224), Some(224), '\u{00e0}'),
    ("ampersand", Some(38), Some(38), Some(38), Some(38), '\u{0026}'),
    ("aring", None, Some(140), Some(229), Some(229), '\u{00e5}'),
    ("asciicircum", Some(94), Some(94), Some(94), Some(94), '\u{005e}'),
    ("asciitilde", Some(126), Some(126), Some(126), Some(126), '\u{007e}'),
    ("asterisk", Some(42), Some(42), Some(42), Some(42), '\u{002a}'),
    ("at", Some(64), Some(64), Some(64), Some(64), '\u{0040}'),
    ("atilde", None, Some(139), Some(227), Some(227), '\u{00e3}'),
    ("b", Some(98), Some(98), Some(98), Some(98), '\u{0062}'),
    ("backslash", Some(92), Some(92), Some(92), Some(92), '\u{005c}'),
    ("bar", Some(124), Some(124), Some(124), Some(124), '\u{007c}'),
    ("braceleft", Some(123), Some(123), Some(123), Some(123), '\u{007b}'),
    ("braceright", Some(125), Some(125), Some(125), Some(125), '\u{007d}'),
    ("bracketleft", Some(91), Some(91), Some(91), Some(91), '\u{005b}'),
    ("bracketright", Some(93), Some(93), Some(93), Some(93), '\u{005d}'),
    ("breve", Some(198), Some(249), None, Some(24), '\u{02d8}'),
    ("brokenbar", None, None, Some(166), Some(166), '\u{00a6}'),
    ("bullet", Some(183), Some(165), Some(149), Some(128), '\u{2022}'),
    ("c", Some(99), Some(99), Some(99), Some(99), '\u{0063}'),
    ("caron", Some(207), Some(255), None, Some(25), '\u{02c7}'),
    ("ccedilla", None, Some(141), Some(231), Some(231), '\u{00e7}'),
    ("cedilla", Some(203), Some(252), Some(184), Some(184), '\u{00b8}'),
    ("cent", Some(162), Some(162), Some(162), Some(162), '\u{00a2}'),
    ("circumflex", Some(195), Some(246), Some(136), Some(26), '\u{02c6}'),
    ("colon", Some(58), Some(58), Some(58), Some(58), '\u{003a}'),
    ("comma", Some(44), Some(44), Some(44), Some(44), '\u{002c}'),
    ("copyright", None, Some(169), Some(169), Some(169), '\u{00a9}'),
    ("currency", Some(168), Some(219), Some(164), Some(164), '\u{00a4}'),
    ("d", Some(100), Some(100), Some(100), Some(100), '\u{0064}'),
    ("dagger", Some(178), Some(160), Some(134), Some(129), '\u{2020}'),
    ("daggerdbl", Some(179), Some(224), Some(135), Some(130), '\u{2021}'),
    ("degree", None, Some(161), Some(176), Some(176), '\u{00b0}'),
    ("dieresis", Some(200), Some(172), Some(168), Some(168), '\u{00a8}'),
    ("divide", None, Some(214), Some(247), Some(247), '\u{00f7}'),
    ("dollar", Some(36), Some(36), Some(36), Some(36), '\u{0024}'),
    ("dotaccent", Some(199), Some(250), None, Some(27), '\u{02d9}'),
    ("dotlessi", Some(245), Some(245), None, Some(154), '\u{0131}'),
    ("e", Some(101), Some(101), Some(101), Some(101), '\u{0065}'),
    ("eacute", None, Some(142), Some(233), Some(233), '\u{00e9}'),
    ("ecircumflex", None, Some(144), Some(234), Some(234), '\u{00ea}'),
    ("edieresis", None, Some(145), Some(235), Some(235), '\u{00eb}'),
    ("egrave", None, Some(143), Some(232), Some(232), '\u{00e8}'),
    ("eight", Some(56), Some(56), Some(56), Some(56), '\u{0038}'),
    ("ellipsis", Some(188), Some(201), Some(133), Some(131), '\u{2026}'),
    ("emdash", Some(208), Some(209), Some(151), Some(132), '\u{2014}'),
    ("endash", Some(177), Some(208), Some(150), Some(133), '\u{2013}'),
    ("equal", Some(61), Some(61), Some(61), Some(61), '\u{003d}'),
    ("eth", None, None, Some(240), Some(240), '\u{00f0}'),
    ("exclam", Some(33), Some(33), Some(33), Some(33), '\u{0021}'),
    ("exclamdown", Some(161), Some(193), Some(161), Some(161), '\u{00a1}'),
    ("f", Some(102), Some(102), Some(102), Some(102), '\u{0066}'),
    ("fi", Some(174), Some(222), None, Some(147), '\u{fb01}'),
    ("five", Some(53), Some(53), Some(53), Some(53), '\u{0035}'),
    ("fl", Some(175), Some(223), None, Some(148), '\u{fb02}'),
    ("florin", Some(166), Some(196), Some(131), Some(134), '\u{0192}'),
    ("four", Some(52), Some(52), Some(52), Some(52), '\u{0034}'),
    ("fraction", Some(164), Some(218), None, Some(135), '\u{2044}'),
    ("g", Some(103), Some(103), Some(103), Some(103), '\u{0067}'),
    ("germandbls", Some(251), Some(167), Some(223), Some(223), '\u{00df}'),
    ("grave", Some(193), Some(96), Some(96), Some(96), '\u{0060}'),
    ("greater", Some(62), Some(62), Some(62), Some(62), '\u{003e}'),
    ("guillemotleft", Some(171), Some(199), Some(171), Some(171), '\u{00ab}'),
    ("guillemotright", Some(187), Some(200), Some(187), Some(187), '\u{00bb}'),
    ("guilsinglleft", Some(172), Some(220), Some(139), Some(136), '\u{2039}'),
    ("guilsinglright", Some(173), Some(221), Some(155), Some(137), '\u{203a}'),
    ("h", Some(104), Some(104), Some(104), Some(104), '\u{0068}'),
    ("hungarumlaut", Some(205), Some(253), None, Some(28), '\u{02dd}'),
    ("hyphen", Some(45), Some(45), Some(45), Some(45), '\u{002d}'),
    ("i", Some(105), Some(105), Some(105), Some(105), '\u{0069}'),
    ("iacute", None, Some(146), Some(237), Some(237), '\u{00ed}'),
    ("icircumflex", None, Some(148), Some(238), Some(238), '\u{00ee}'),
    ("idieresis", None, Some(149), Some(239), Some(239), '\u{00ef}'),
    ("igrave", None, Some(147), Some(236), Some(236), '\u{00ec}'),
    ("j", Some(106), Some(106), Some(106), Some(106), '\u{006a}'),
    ("k", Some(107), Some(107), Some(107), Some(107), '\u{006b}'),
    ("l", Some(108), Some(108), Some(108), Some(108), '\u{006c}'),
    ("less", Some(60), Some(60), Some(60), Some(60), '\u{003c}'),
    ("logicalnot", None, Some(194), Some(172), Some(172), '\u{00ac}'),
    ("lslash", Some(248), None, None, Some(155), '\u{0142}'),
    ("m", Some(109), Some(109), Some(109), Some(109), '\u{006d}'),
    ("macron", Some(197), Some(248), Some(175), Some(175), '\u{00af}'),
    ("minus", None, None, None, Some(138), '\u{2212}'),
    ("mu", None, Some(181), Some(181), Some(181), '\u{00b5}'),
    ("multiply", None, None, Some(215), Some(215), '\u{00d7}'),
    ("n", Some(110), Some(110), Some(110), Some(110), '\u{006e}'),
    ("nbspace", None, Some(202), Some(160), None, '\u{00a0}'),
    ("nine", Some(57), Some(57), Some(57), Some(57), '\u{0039}'),
    ("ntilde", None, Some(150), Some(241), Some(241), '\u{00f1}'),
    ("numbersign", Some(35), Some(35), Some(35), Some(35), '\u{0023}'),
    ("o", Some(111), Some(111), Some(111), Some(111), '\u{006f}'),
    ("oacute", None, Some(151), Some(243), Some(243), '\u{00f3}'),
    ("ocircumflex", None, Some(153), Some(244), Some(244), '\u{00f4}'),
    ("odieresis", None, Some(154), Some(246), Some(246), '\u{00f6}'),
    ("oe", Some(250), Some(207), Some(156), Some(156), '\u{0153}'),
    ("ogonek", Some(206), Some(254), None, Some(29), '\u{02db}'),
    ("ograve", None, Some(152), Some(242), Some(242), '\u{00f2}'),
    ("one", Some(49), Some(49), Some(49), Some(49), '\u{0031}'),
    ("onehalf", None, None, Some(189), Some(189), '\u{00bd}'),
    ("onequarter", None, None, Some(188), Some(188), '\u{00bc}'),
    ("onesuperior", None, None, Some(185), Some(185), '\u{00b9}'),
    ("ordfeminine", Some(227), Some(187), Some(170), Some(170), '\u{00aa}'),
    ("ordmasculine", Some(235), Some(188), Some(186), Some(186), '\u{00ba}'),
    ("oslash", Some(249), Some(191), Some(248), Some(248), '\u{00f8}'),
    ("otilde", None, Some(155), Some(245), Some(245), '\u{00f5}'),
    ("p", Some(112), Some(112), Some(112), Some(112), '\u{0070}'),
    ("paragraph", Some(182), Some(166), Some(182), Some(182), '\u{00b6}'),
    ("parenleft", Some(40), Some(40), Some(40), Some(40), '\u{0028}'),
    ("parenright", Some(41), Some(41), Some(41), Some(41), '\u{0029}'),
    ("percent", Some(37), Some(37), Some(37), Some(37), '\u{0025}'),
    ("period", Some(46), Some(46), Some(46), Some(46), '\u{002e}'),
    ("periodcentered", Some(180), Some(225), Some(183), Some(183), '\u{00b7}'),
    ("perthousand", Some(189), Some(228), Some(137), Some(139), '\u{2030}'),
    ("plus", Some(43), Some(43), Some(43), Some(43), '\u{002b}'),
    ("plusminus", None, Some(177), Some(177), Some(177), '\u{00b1}'),
    ("q", Some(113), Some(113), Some(113), Some(113), '\u{0071}'),
    ("question", Some(63), Some(63), Some(63), Some(63), '\u{003f}'),
    ("questiondown", Some(191), Some(192), Some(191), Some(191), '\u{00bf}'),
    ("quotedbl", Some(34), Some(34), Some(34), Some(34), '\u{0022}'),
    ("quotedblbase", Some(185), Some(227), Some(132), Some(140), '\u{201e}'),
    ("quotedblleft", Some(170), Some(210), Some(147), Some(141), '\u{201c}'),
    ("quotedblright", Some(186), Some(211), Some(148), Some(142), '\u{201d}'),
    ("quoteleft", Some(96), Some(212), Some(145), Some(143), '\u{2018}'),
    ("quoteright", Some(39), Some(213), Some(146), Some(144), '\u{2019}'),
    ("quotesinglbase", Some(184), Some(226), Some(130), Some(145), '\u{201a}'),
    ("quotesingle", Some(169), Some(39), Some(39), Some(39), '\u{0027}'),
    ("r", Some(114), Some(114), Some(114), Some(114), '\u{0072}'),
    ("registered", None, Some(168), Some(174), Some(174), '\u{00ae}'),
    ("ring", Some(202), Some(251), None, Some(30), '\u{02da}'),
    ("s", Some(115), Some(115), Some(115), Some(115), '\u{0073}'),
    ("scaron", None, None, Some(154), Some(157), '\u{0161}'),
    ("section", Some(167), Some(164), Some(167), Some(167), '\u{00a7}'),
    ("semicolon", Some(59), Some(59), Some(59), Some(59), '\u{003b}'),
    ("seven", Some(55), Some(55), Some(55), Some(55), '\u{0037}'),
    ("six", Some(54), Some(54), Some(54), Some(54), '\u{0036}'),
    ("slash", Some(47), Some(47), Some(47), Some(47), '\u{002f}'),
    ("space", Some(32), Some(32), Some(32), Some(32), '\u{0020}'),
    ("space", None, Some(202), Some(160), None, '\u{00a0}'),
    ("space", None, Some(202), Some(173), None, '\u{00ad}'),
    ("sterling", Some(163), Some(163), Some(163), Some(163), '\u{00a3}'),
    ("t", Some(116), Some(116), Some(116), Some(116), '\u{0074}'),
    ("thorn", None, None, Some(254), Some(254), '\u{00fe}'),
    ("three", Some(51), Some(51), Some(51), Some(51), '\u{0033}'),
    ("threequarters", None, None, Some(190), Some(190), '\u{00be}'),
    ("threesuperior", None, None, Some(179), Some(179), '\u{00b3}'),
    ("tilde", Some(196), Some(247), Some(152), Some(31), '\u{02dc}'),
    ("trademark", None, Some(170), Some(153), Some(146), '\u{2122}'),
    ("two", Some(50), Some(50), Some(50), Some(50), '\u{0032}'),
    ("twosuperior", None, None, Some(178), Some(178), '\u{00b2}'),
    ("u", Some(117), Some(117), Some(117), Some(117), '\u{0075}'),
    ("uacute", None, Some(156), Some(250), Some(250), '\u{00fa}'),
    ("ucircumflex", None, Some(158), Some(251), Some(251), '\u{00fb}'),
    ("udieresis", None, Some(159), Some(252), Some(252), '\u{00fc}'),
    ("ugrave", None, Some(157), Some(249), Some(249), '\u{00f9}'),
    ("underscore", Some(95), Some(95), Some(95), Some(95), '\u{005f}'),
    ("v", Some(118), Some(118), Some(118), Some(118), '\u{0076}'),
    ("w", Some(119), Some(119), Some(119), Some(119), '\u{0077}'),
    ("x", Some(120), Some(120), Some(120), Some(120), '\u{0078}'),
    ("y", Some(121), Some(121), Some(121), Some(121), '\u{0079}'),
    ("yacute", None, None, Some(253), Some(253), '\u{00fd}'),
    ("ydieresis", None, Some(216), Some(255), Some(255), '\u{00ff}'),
    ("yen", Some(165), Some(180), Some(165), Some(165), '\u{00a5}'),
    ("z", Some(122), Some(122), Some(122), Some(122), '\u{007a}'),
    ("zcaron", None, None, Some(158), Some(158), '\u{017e}'),
    ("zero", Some(48), Some(48), Some(48), Some(48), '\u{0030}'),
];
